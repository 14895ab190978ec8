use heartcare_import::augment::SyntheticAugmenter;
use heartcare_import::importer::{ErrorKind, ImportError, Importer};
use heartcare_import::loader::{DuckDbStore, LoadError, Loader, MemoryLoader, RowId};
use heartcare_import::schema::{Record, TargetTable};
use std::fs;
use tempfile::TempDir;

const USERS_DUMP: &str = "\
SET NOCOUNT ON;
GO
INSERT INTO [dbo].[Users] ([email], [password_hash], [full_name], [role])
VALUES
(N'bs.an@heartcare.vn', N'$2b$12$abc', N'Nguyễn Văn An', N'doctor'),
(N'bs.linh@heartcare.vn', N'$2b$12$def', N'Trần Thị Linh', N'doctor');
GO
";

const PATIENTS_DUMP: &str = "\
INSERT INTO Patients (citizen_id, full_name, gender, date_of_birth, province)
VALUES
(N'079000000001', N'An', N'Nam', '1990-01-01', N'Hà Nội'),
(N'079000000002', N'Linh', N'Nữ', NULL, N'Huế'),
(N'079000000003', N'Bình', N'Nam', '1985-05-20');
GO
INSERT INTO AuditLog (id, action) VALUES (1, 'login');
GO
INSERT INTO Patients (full_name) VALUES (N'Broken', (1);
GO
";

const HEART_DUMP: &str = "\
-- 3 real rows, the rest are synthetic to reach 12 rows
INSERT INTO HeartRecords (patient_id, age, sex, cp, trestbps, chol, fbs, restecg, thalach, exang, oldpeak, slope, ca, thal, target, recorded_by, recorded_at)
VALUES
(1, 63, N'Nam', 3, 145, 233, 1, 0, 150, 0, 2.3, 0, 0, 1, 1, 2, '2025-10-01 08:00:00'),
(2, 37, N'Nữ', 2, 130, 250, 0, 1, 187, 0, 3.5, 0, 0, 2, 1, 2, '2025-10-02 08:00:00'),
(1, 41, N'Nữ', 1, 130, 204, 0, 0, 172, 0, 1.4, 2, 0, 2, 0, 2, '2025-10-03 08:00:00');
GO
";

/// A store whose connection is gone
struct DeadStore {
    attempts: usize,
}

impl Loader for DeadStore {
    fn insert(&mut self, _table: TargetTable, _record: &Record) -> Result<RowId, LoadError> {
        self.attempts += 1;
        Err(LoadError::Unavailable("connection lost".into()))
    }
}

/// Rejects every patient, accepts everything else
struct PickyStore {
    inner: MemoryLoader,
}

impl Loader for PickyStore {
    fn insert(&mut self, table: TargetTable, record: &Record) -> Result<RowId, LoadError> {
        if table == TargetTable::Patients {
            return Err(LoadError::Rejected {
                table,
                reason: "constraint".into(),
            });
        }
        self.inner.insert(table, record)
    }
}

mod tests {
    use super::*;

    #[test]
    fn test_users_import_is_idempotent() {
        let mut store = DuckDbStore::open_in_memory().unwrap();

        let mut importer = Importer::new(&mut store);
        importer.import_dump(USERS_DUMP).unwrap();
        importer.import_dump(USERS_DUMP).unwrap();
        let summary = importer.finish();

        assert_eq!(summary.loaded(TargetTable::Users), 4);
        assert_eq!(store.row_count(TargetTable::Users).unwrap(), 2);
    }

    #[test]
    fn test_skips_are_counted_and_run_continues() {
        let mut loader = MemoryLoader::new();

        let mut importer = Importer::new(&mut loader);
        importer.import_dump(PATIENTS_DUMP).unwrap();
        let summary = importer.finish();

        assert_eq!(summary.loaded(TargetTable::Patients), 2);
        assert_eq!(summary.skipped(ErrorKind::ColumnCountMismatch), 1);
        assert_eq!(summary.skipped(ErrorKind::UnknownTable), 1);
        assert_eq!(summary.skipped(ErrorKind::StructuralParse), 1);
        assert_eq!(summary.total_skipped(), 3);
        assert_eq!(loader.count(TargetTable::Patients), 2);
    }

    #[test]
    fn test_rejected_records_are_skipped() {
        let mut store = PickyStore {
            inner: MemoryLoader::new(),
        };

        let mut importer = Importer::new(&mut store);
        importer.import_dump(PATIENTS_DUMP).unwrap();
        importer.import_dump(USERS_DUMP).unwrap();
        let summary = importer.finish();

        assert_eq!(summary.loaded(TargetTable::Patients), 0);
        assert_eq!(summary.loaded(TargetTable::Users), 2);
        assert_eq!(summary.skipped(ErrorKind::LoadRejected), 2);
    }

    #[test]
    fn test_unavailable_store_aborts() {
        let mut store = DeadStore { attempts: 0 };

        let mut importer = Importer::new(&mut store);
        let err = importer.import_dump(USERS_DUMP).unwrap_err();

        assert!(matches!(
            err,
            ImportError::Aborted {
                kind: ErrorKind::LoadUnavailable,
                ..
            }
        ));
        assert_eq!(store.attempts, 1);
    }

    #[test]
    fn test_missing_sources_import_nothing() {
        let dir = TempDir::new().unwrap();
        let mut loader = MemoryLoader::new();

        let mut importer = Importer::new(&mut loader);
        importer
            .import_sources(&dir.path().join("data.sql"), &dir.path().join("data"))
            .unwrap();
        let summary = importer.finish();

        assert_eq!(summary.files, 0);
        assert_eq!(summary.total_loaded(), 0);
        assert!(loader.is_empty());
    }

    #[test]
    fn test_sources_into_duckdb_with_augmentation() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("data");
        fs::create_dir(&data_dir).unwrap();

        let dump = dir.path().join("data.sql");
        fs::write(&dump, USERS_DUMP).unwrap();
        fs::write(data_dir.join("01_patients.sql"), PATIENTS_DUMP).unwrap();
        fs::write(data_dir.join("02_heart.SQL"), HEART_DUMP).unwrap();
        fs::write(data_dir.join("readme.txt"), "not a dump").unwrap();

        let mut store = DuckDbStore::open_in_memory().unwrap();
        let mut importer =
            Importer::new(&mut store).with_augmentation("HeartRecords", SyntheticAugmenter::new(7));
        importer.import_sources(&dump, &data_dir).unwrap();
        let summary = importer.finish();

        assert_eq!(summary.files, 3);
        assert_eq!(summary.loaded(TargetTable::Users), 2);
        assert_eq!(summary.loaded(TargetTable::Patients), 2);
        assert_eq!(summary.loaded(TargetTable::Predictions), 12);
        assert_eq!(store.row_count(TargetTable::Predictions).unwrap(), 12);

        let max_date: String = store
            .connection()
            .query_row(
                "SELECT CAST(MAX(prediction_date) AS VARCHAR) FROM predictions",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(max_date, "2025-10-12 08:00:00");
    }

    #[test]
    fn test_oversized_marker_leaves_statement_unpadded() {
        let dump = HEART_DUMP.replace("reach 12 rows", "reach 1000000000 rows");
        let mut loader = MemoryLoader::new();

        let mut importer =
            Importer::new(&mut loader).with_augmentation("HeartRecords", SyntheticAugmenter::new(7));
        importer.import_dump(&dump).unwrap();
        let summary = importer.finish();

        assert_eq!(summary.loaded(TargetTable::Predictions), 3);
        assert_eq!(summary.total_skipped(), 0);
    }

    #[test]
    fn test_marker_ignored_without_augmentation() {
        let mut loader = MemoryLoader::new();

        let mut importer = Importer::new(&mut loader);
        importer.import_dump(HEART_DUMP).unwrap();
        let summary = importer.finish();

        assert_eq!(summary.loaded(TargetTable::Predictions), 3);
        assert!(loader
            .records()
            .all(|r| r.get("prediction_date").and_then(|v| v.as_text()).is_some()));
    }

    #[test]
    fn test_summary_serializes_to_json() {
        let mut loader = MemoryLoader::new();
        let mut importer = Importer::new(&mut loader);
        importer.import_dump(PATIENTS_DUMP).unwrap();
        let summary = importer.finish();

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["loaded"]["patients"], 2);
        assert_eq!(json["skipped"]["unknown_table"], 1);
    }
}

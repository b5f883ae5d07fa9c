#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use leave_normalizer::request::{EmployeeCode, LeaveRequest};
use leave_normalizer::session::Session;
use tempfile::{TempDir, tempdir};

pub const LEAVE_HEADER: &str = "EmployeeCode,LeaveType,AppliedFrom,AppliedTill,FromSession,ToSession,NumberOfDays,AppliedOn,ApplierRemarks,Status";

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.file(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes a leave export with the canonical header and the given data lines.
    pub fn write_leave_csv(&self, name: &str, lines: &[&str]) -> PathBuf {
        let mut contents = String::from(LEAVE_HEADER);
        contents.push('\n');
        for line in lines {
            contents.push_str(line);
            contents.push('\n');
        }
        self.write(name, &contents)
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn leave_request(
    employee: &str,
    from: NaiveDate,
    till: NaiveDate,
    from_session: Session,
    to_session: Session,
) -> LeaveRequest {
    LeaveRequest {
        line: 2,
        employee_code: EmployeeCode::new(employee),
        leave_type: Some("Casual Leave".to_string()),
        applied_from: from,
        applied_till: till,
        from_session,
        to_session,
        number_of_days: None,
        applied_on: Some("2025-05-30".to_string()),
        applier_remarks: None,
        status: "Approved".to_string(),
        raw: Vec::new(),
    }
}

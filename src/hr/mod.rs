//! Typed attendance and payroll calls for the HR backend.
//!
//! Every call goes through [`ResilientClient`], so it inherits the timeout
//! retry policy. Error statuses are turned into failures with
//! [`Response::error_for_status`](crate::Response::error_for_status).

mod attendance;
mod payroll;

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{ClassifiedFailure, FailureCategory, RequestSpec, ResilientClient, Response, Result};

pub use attendance::{filter_month, format_hms, parse_clock, AttendanceEntry, StaffRef};
pub use payroll::{previous_month, PayrollQuery, Payslip, PayslipTotals};

pub const ATTENDANCE_PATH: &str = "/attendance/getEmployeeSiteData";
pub const PAYROLL_PATH: &str = "/payrollmanagement/getpayrollbyMonthYear";

/// Backend envelope: `{ "data": [...] }`. A missing or null `data` is empty.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct DataEnvelope<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    data: Vec<T>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// HR endpoints on top of a [`ResilientClient`].
#[derive(Clone, Debug)]
pub struct HrApi {
    client: ResilientClient,
}

impl HrApi {
    pub fn new(client: ResilientClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ResilientClient {
        &self.client
    }

    /// All attendance records the backend returns for `staff`.
    pub async fn attendance(&self, staff: &StaffRef) -> Result<Vec<AttendanceEntry>> {
        self.post_for_data(ATTENDANCE_PATH, staff).await
    }

    /// Attendance of `staff` within the calendar month containing `month`.
    pub async fn monthly_attendance(
        &self,
        staff: &StaffRef,
        month: NaiveDate,
    ) -> Result<Vec<AttendanceEntry>> {
        let entries = self.attendance(staff).await?;
        let kept = filter_month(entries, &staff.staff_id, month);
        #[cfg(feature = "tracing")]
        tracing::debug!("{} attendance entries in {}", kept.len(), month.format("%m-%Y"));
        Ok(kept)
    }

    /// Attendance of `staff` for the current local month.
    pub async fn current_month_attendance(&self, staff: &StaffRef) -> Result<Vec<AttendanceEntry>> {
        let today = chrono::Local::now().date_naive();
        self.monthly_attendance(staff, today).await
    }

    /// The payslip of `employee_id` for `month`/`year`, or `None` when the
    /// backend has no record.
    pub async fn payslip(&self, employee_id: Value, month: u32, year: i32) -> Result<Option<Payslip>> {
        let query = PayrollQuery::new(employee_id, month, year);
        let records: Vec<Payslip> = self.post_for_data(PAYROLL_PATH, &query).await?;
        Ok(records.into_iter().next())
    }

    async fn post_for_data<B, T>(&self, path: &str, payload: &B) -> Result<Vec<T>>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let spec = match RequestSpec::post(path).json(payload) {
            Ok(spec) => spec,
            Err(err) => {
                return Err(self.reported(ClassifiedFailure::new(
                    FailureCategory::Unexpected,
                    format!("request payload could not be encoded: {err}"),
                )))
            }
        };
        // Transport failures were already reported by the client.
        let response = self.client.execute(spec).await?;
        decode_data(path, response).map_err(|failure| self.reported(failure))
    }

    fn reported(&self, failure: ClassifiedFailure) -> ClassifiedFailure {
        self.client.notify(&failure);
        failure
    }
}

fn decode_data<T: DeserializeOwned>(path: &str, response: Response) -> Result<Vec<T>> {
    let response = response.error_for_status()?;
    let envelope: DataEnvelope<T> = response.json().map_err(|err| {
        ClassifiedFailure::new(
            FailureCategory::Unexpected,
            format!("invalid response JSON from {path}: {err}"),
        )
        .with_status(response.status().as_u16())
        .with_attempts(response.attempts())
    })?;
    Ok(envelope.data)
}

/// Text form of an id, so numeric and string ids compare equal.
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => Some(text.trim().to_owned()),
        _ => None,
    }
}

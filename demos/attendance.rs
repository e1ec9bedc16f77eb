use hrms_http::{
    hr::{format_hms, previous_month, HrApi, StaffRef},
    ClassifiedFailure, ResilientClient,
};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = ResilientClient::from_env()
        .map_err(anyhow::Error::msg)?
        .with_observer(|failure: &ClassifiedFailure| {
            let notice = failure.notice();
            eprintln!("{}: {}", notice.title, notice.message);
        });
    let api = HrApi::new(client);

    let staff = StaffRef {
        staff_id: json!(1),
        site_id: json!(1),
        branch_id: json!(1),
    };

    for entry in api.current_month_attendance(&staff).await? {
        println!(
            "{} {}",
            entry.date.as_deref().unwrap_or("--"),
            format_hms(entry.worked_time())
        );
    }

    let (month, year) = previous_month(chrono::Local::now().date_naive());
    match api.payslip(json!(1), month, year).await? {
        Some(slip) => println!("net pay {month}/{year}: {:.2}", slip.totals().net_pay),
        None => println!("no payslip for {month}/{year}"),
    }

    Ok(())
}

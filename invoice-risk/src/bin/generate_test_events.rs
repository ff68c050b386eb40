use chrono::{Duration, Utc};
use invoice_risk::types::RawEvent;
use rand::Rng;
use uuid::Uuid;

fn generate_event(rng: &mut impl Rng) -> RawEvent {
    let pay_delay = rng.gen_range(1..=500);
    let late = rng.gen_bool(0.6);
    // A sprinkle of zero-amount events exercises the validity filter.
    let amount = if rng.gen_ratio(1, 20) {
        0.0
    } else {
        (rng.gen_range(50.0..20_000.0_f64) * 100.0).round() / 100.0
    };
    let due = Utc::now() - Duration::days(pay_delay);

    RawEvent {
        invoice_id: Some(format!("INV-{}", Uuid::new_v4())),
        activity: Some("Clear Invoice".to_string()),
        datetime: Some(Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        resource: Some(format!("user-{}", rng.gen_range(1..50))),
        invoice_vendor: Some(format!("vendor-{}", rng.gen_range(1..200))),
        invoice_amount: amount,
        invoice_due_date: Some(due.format("%Y-%m-%d").to_string()),
        pay_type: Some(if late { "Late" } else { "OnTime" }.to_string()),
        pay_delay: if late { pay_delay } else { 0 },
        invoice_is_overdue: Some(if late { "TRUE" } else { "FALSE" }.to_string()),
        ..Default::default()
    }
}

// Emits sample procurement events as JSON lines on stdout, spread across
// every branch of the pipeline. Pipe it into the service binary.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let count: usize = std::env::args()
        .nth(1)
        .map(|arg| arg.parse())
        .transpose()?
        .unwrap_or(500);

    let mut rng = rand::thread_rng();
    for _ in 0..count {
        let event = generate_event(&mut rng);
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}

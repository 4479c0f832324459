//! Terminal rendering of cost estimates

use domain_pricing::CostEstimate;

/// Render the four period totals plus the monthly breakdown.
pub fn render_table(kind: &str, region: &str, estimate: &CostEstimate) -> String {
    let mut out = String::new();

    out.push_str(&format!("Cost estimate - {kind} ({region})\n"));
    out.push_str(&format!("{}\n", "=".repeat(50)));
    out.push_str(&format!("Hourly:   {}\n", usd(estimate.hourly)));
    out.push_str(&format!("Daily:    {}\n", usd(estimate.daily)));
    out.push_str(&format!("Monthly:  {}\n", usd(estimate.monthly)));
    out.push_str(&format!("Yearly:   {}\n", usd(estimate.yearly)));

    if !estimate.breakdown.is_empty() {
        out.push('\n');
        out.push_str("Breakdown (monthly)\n");
        out.push_str(&format!("{}\n", "-".repeat(50)));
        for line in &estimate.breakdown {
            out.push_str(&format!(
                "{:<38} {:>10}\n",
                line.name,
                usd(line.monthly_cost)
            ));
        }
    }

    out
}

/// Format a USD amount; sub-cent values keep four decimals so hourly rates
/// don't round to zero.
fn usd(value: f64) -> String {
    if value != 0.0 && value.abs() < 0.01 {
        format!("${value:.4}")
    } else {
        format!("${value:.2}")
    }
}

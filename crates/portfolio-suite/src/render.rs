use smart_watchlist::Watchlist;

use crate::workflows::{CapabilityRegistry, Workflow};

pub fn home_page(registry: &CapabilityRegistry) -> String {
    let mut out = String::new();
    out.push_str("Portfolio Management Suite\n");
    out.push_str("==========================\n\n");
    for workflow in Workflow::all() {
        if workflow == Workflow::Home {
            continue;
        }
        let status = if registry.is_available(workflow) {
            "available"
        } else {
            "coming soon"
        };
        out.push_str(&format!("{} [{}]\n  {}\n\n", workflow, status, workflow.summary()));
    }
    out.push_str("Select a tool with SUITE_WORKFLOW=tactical|quality\n");
    out
}

pub fn watchlist_table(watchlist: &Watchlist) -> String {
    let mut out = format!(
        "{:<8} {:>10} {:>10} {:>10} {:>10} {:>8} {:>8}  {}\n",
        "Symbol", "Price", "Low", "High", "Target", "Move", "P(up)", "Group"
    );
    for (symbol, e) in watchlist.iter() {
        // `!` marks a price already outside its own forecast range
        let flag = if e.price_in_range() { ' ' } else { '!' };
        out.push_str(&format!(
            "{:<8} {:>9.2}{} {:>10.2} {:>10.2} {:>10.2} {:>+7.2}% {:>7.1}%  {}\n",
            symbol,
            e.current_price,
            flag,
            e.range_low,
            e.range_high,
            e.target_price,
            e.potential_return(),
            e.bullish_probability * 100.0,
            e.group.as_deref().unwrap_or("-")
        ));
    }

    let report = watchlist.report();
    out.push_str(&format!(
        "\n{} of {} instruments selected, {} excluded{}\n",
        watchlist.len(),
        report.scanned,
        report.excluded.len(),
        if report.partial { " (partial scan)" } else { "" }
    ));
    for exclusion in &report.excluded {
        out.push_str(&format!("  - {}: {}\n", exclusion.symbol, exclusion.reason));
    }
    out
}

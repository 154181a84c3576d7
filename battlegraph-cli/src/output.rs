/// Output formatting: terminal table and JSON.
use battlegraph_core::Standing;
use serde::Serialize;

use crate::simulate::ChooserReport;

#[derive(Serialize)]
struct JsonOutput<'a> {
    items: Vec<&'a Standing<String>>,
    decisions: usize,
    remaining: usize,
    complete: bool,
}

/// Standings ordered for display: best balance first, input order on ties.
pub fn display_order(standings: &[Standing<String>]) -> Vec<&Standing<String>> {
    let mut sorted: Vec<&Standing<String>> = standings.iter().collect();
    sorted.sort_by_key(|s| std::cmp::Reverse(s.balance()));
    sorted
}

/// Print standings as a formatted terminal table.
pub fn print_table(standings: &[Standing<String>], decisions: usize, remaining: usize) {
    let name_width = standings.iter()
        .map(|s| s.item.len())
        .max()
        .unwrap_or(4)
        .max(4); // at least "Item"

    println!(" # | {:<name_width$} | Wins | Losses | Settled", "Item");
    println!("---|-{}-|------|--------|--------", "-".repeat(name_width));

    for (i, s) in display_order(standings).into_iter().enumerate() {
        println!(
            "{:>2} | {:<name_width$} | {:>4} | {:>6} | {:>7}",
            i + 1, s.item, s.wins, s.losses, if s.settled { "yes" } else { "" },
        );
    }

    if remaining == 0 {
        println!("\n{} items fully ordered after {} decisions", standings.len(), decisions);
    } else {
        println!(
            "\n{} items, {} decisions, {} pairs still undecided",
            standings.len(), decisions, remaining,
        );
    }
}

/// Print standings as JSON.
pub fn print_json(standings: &[Standing<String>], decisions: usize, remaining: usize) {
    let output = JsonOutput {
        items: display_order(standings),
        decisions,
        remaining,
        complete: remaining == 0,
    };
    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

/// Print simulation results as a table, one row per chooser.
pub fn print_simulation_table(reports: &[ChooserReport], items: usize, trials: usize) {
    println!("Chooser            | Mean decisions |  Min |  Max | Mean ms");
    println!("-------------------|----------------|------|------|--------");
    for r in reports {
        println!(
            "{:<18} | {:>14.1} | {:>4} | {:>4} | {:>7.2}",
            r.chooser, r.mean_decisions, r.min_decisions, r.max_decisions, r.mean_millis,
        );
    }
    println!(
        "\n{} items, {} trials per chooser ({} pairs without transitivity)",
        items, trials, items * items.saturating_sub(1) / 2,
    );
}

pub fn print_simulation_json(reports: &[ChooserReport]) {
    println!("{}", serde_json::to_string_pretty(reports).unwrap());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(item: &str, wins: usize, losses: usize) -> Standing<String> {
        Standing { item: item.to_string(), wins, losses, settled: false }
    }

    #[test]
    fn test_display_order_by_balance() {
        let standings = vec![standing("c", 0, 2), standing("a", 2, 0), standing("b", 1, 1), standing("d", 0, 0)];
        let names: Vec<&str> = display_order(&standings).iter().map(|s| s.item.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "d", "c"]);
    }

    #[test]
    fn test_json_shape() {
        let standings = vec![standing("x", 1, 0), standing("y", 0, 1)];
        let output = JsonOutput { items: display_order(&standings), decisions: 1, remaining: 0, complete: true };
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["items"][0]["item"], "x");
        assert_eq!(value["items"][1]["losses"], 1);
        assert_eq!(value["complete"], true);
    }
}

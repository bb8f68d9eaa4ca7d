use std::collections::BTreeMap;
use std::sync::Arc;

use colored::*;

use gacha_runtime::{Cost, DrawableItem, Rarity, RarityCount, RollUntilOutcome, SimulationResult, SsrBuckets};

pub fn rarity_label(rarity: Rarity) -> ColoredString {
    match rarity {
        Rarity::SSR => "SSR".yellow().bold(),
        Rarity::SR => "SR".cyan(),
        Rarity::R => "R".normal(),
    }
}

/// Groups drawn items by display name, most frequent first.
pub fn tally(items: &[Arc<DrawableItem>]) -> Vec<(String, Rarity, usize)> {
    let mut counts: BTreeMap<(String, Rarity), usize> = BTreeMap::new();
    for item in items {
        *counts.entry((item.display_name(), item.rarity)).or_default() += 1;
    }
    let mut tallied: Vec<_> = counts.into_iter().map(|((name, rarity), n)| (name, rarity, n)).collect();
    tallied.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.cmp(&a.2)).then(a.0.cmp(&b.0)));
    tallied
}

pub fn counts_line(count: &RarityCount) -> String {
    format!(
        "{} {}  {} {}  {} {}  ({} draws, {:.2}% SSR)",
        rarity_label(Rarity::SSR), count.ssr,
        rarity_label(Rarity::SR), count.sr,
        rarity_label(Rarity::R), count.r,
        count.total(),
        count.rate(Rarity::SSR) * 100.0,
    )
}

pub fn cost_line(cost: &Cost) -> String {
    format!("{} crystals, ~¥{}, ~${}", cost.crystals, cost.jpy, cost.usd)
}

pub fn print_result(title: &str, result: &SimulationResult, cost: &Cost) {
    println!("\n{}", title.bold());
    println!("  {}", counts_line(&result.count));
    for (name, rarity, n) in tally(&result.items) {
        if n > 1 {
            println!("  {} {} x{}", rarity_label(rarity), name, n);
        } else {
            println!("  {} {}", rarity_label(rarity), name);
        }
    }
    println!("  {}", cost_line(cost).dimmed());
}

pub fn print_outcome(outcome: &RollUntilOutcome) {
    let season = outcome.season.map(|s| format!(", {}", s)).unwrap_or_default();
    println!(
        "\n{} {} after {} draws on a {} banner{}",
        "Found".green().bold(),
        outcome.target.display_name(),
        outcome.count,
        outcome.promotion,
        season,
    );
    println!("  {}", cost_line(&outcome.cost).dimmed());
}

pub fn print_rates(buckets: &SsrBuckets) {
    println!("\n{} {:.1}% of all draws", "SSR budget".bold(), buckets.budget());
    for (bucket, weight) in buckets.weights() {
        println!(
            "  {:<8} {:>6.3}% ({} items)",
            bucket.to_string(),
            weight * buckets.budget(),
            buckets.pool(bucket).len(),
        );
    }
    println!(
        "  per item: weapon {:.4}%, limited {:.4}%, summon {:.4}%",
        buckets.weapon_rate(), buckets.limited_rate(), buckets.summon_rate(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use gacha_runtime::{BilingualName, ItemKind, PromotionFlags, SeasonFlags};
    use sqlx::types::Uuid;

    fn item(name: &str, rarity: Rarity) -> Arc<DrawableItem> {
        Arc::new(DrawableItem {
            id: Uuid::new_v4(),
            name: BilingualName::new(name, ""),
            rarity,
            kind: ItemKind::Summon,
            character: None,
            promotions: PromotionFlags::default(),
            seasons: SeasonFlags::default(),
        })
    }

    #[test]
    fn test_tally_orders_by_rarity_then_count() {
        let bahamut = item("Bahamut", Rarity::SSR);
        let items = vec![
            item("Tiamat", Rarity::SR),
            bahamut.clone(),
            item("Lucifer", Rarity::SSR),
            bahamut,
            item("Tiamat", Rarity::SR),
        ];

        let tallied = tally(&items);
        assert_eq!(tallied[0], ("Bahamut".to_string(), Rarity::SSR, 2));
        assert_eq!(tallied[1], ("Lucifer".to_string(), Rarity::SSR, 1));
        assert_eq!(tallied[2], ("Tiamat".to_string(), Rarity::SR, 2));
    }
}

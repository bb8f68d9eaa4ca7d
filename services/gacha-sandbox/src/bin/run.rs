use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use gacha_common::EnvVars;
use gacha_runtime::{
    setup_tracing, Banner, CatalogCache, CostModel, DrawEngine, GachaEnv, GachaError, ItemDetail,
    Promotion, RateUpEntry, RateUpStore, RollUntil, RollUntilRequest, Season, CRYSTALS_PER_DRAW,
    SPARK_DRAWS,
};
use gacha_sandbox::{catalog::select_backend, report};

const ACTIONS: &[&str] = &[
    "Single draw",
    "Ten-part draw",
    "Spark (300 draws)",
    "Roll until...",
    "Show SSR rates",
    "Change banner",
    "Manage rate-ups",
    "Refresh catalog",
    "Quit",
];

struct Sandbox {
    env: GachaEnv,
    cost_model: CostModel,
    cache: CatalogCache,
    store: Option<RateUpStore>,
    user_id: String,
    promotion: Promotion,
    season: Option<Season>,
    rate_ups: Vec<RateUpEntry>,
}

async fn select<S: ToString>(prompt: &str, items: &[S]) -> Result<usize> {
    let owned_items: Vec<String> = items.iter().map(|s| s.to_string()).collect();
    let prompt_owned = prompt.to_string();
    let selection = tokio::task::spawn_blocking(move || {
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(&prompt_owned)
            .default(0)
            .items(&owned_items)
            .interact()
    })
    .await?
    .context("User did not make a selection")?;
    Ok(selection)
}

async fn input(prompt: &str) -> Result<String> {
    let prompt_owned = prompt.to_string();
    let line = tokio::task::spawn_blocking(move || {
        Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(&prompt_owned)
            .interact_text()
    })
    .await??;
    Ok(line.trim().to_string())
}

async fn confirm(prompt: &str) -> Result<bool> {
    let prompt_owned = prompt.to_string();
    let answer = tokio::task::spawn_blocking(move || {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(&prompt_owned)
            .default(false)
            .interact()
    })
    .await??;
    Ok(answer)
}

impl Sandbox {
    fn banner(&self) -> Banner {
        Banner::new(self.promotion, self.season, self.rate_ups.clone())
    }

    fn banner_label(&self) -> String {
        let season = self.season.map(|s| format!(" / {}", s)).unwrap_or_default();
        format!("{}{} banner, {} rate-ups", self.promotion, season, self.rate_ups.len())
    }

    async fn engine(&self) -> Result<DrawEngine> {
        let banner = self.banner();
        for entry in banner.dropped() {
            println!("  {} {} does not apply to this banner", "skipped".yellow(), entry.item.display_name());
        }
        let snapshot = self.cache.snapshot_fresh().await?;
        Ok(DrawEngine::new(snapshot, banner)?)
    }

    async fn single_draw(&self) -> Result<()> {
        let engine = self.engine().await?;
        let item = engine.single_roll(&mut rand::rng())?;
        println!("\n  {} {}", report::rarity_label(item.rarity), item.display_name());
        println!("  {}", format!("{} crystals", CRYSTALS_PER_DRAW).dimmed());
        Ok(())
    }

    async fn ten_draw(&self) -> Result<()> {
        let engine = self.engine().await?;
        let result = engine.ten_part_roll(1, ItemDetail::Full, &mut rand::rng())?;
        report::print_result("Ten-part draw", &result, &self.cost_model.cost_of(result.draws()));
        Ok(())
    }

    async fn spark(&self) -> Result<()> {
        let engine = self.engine().await?;
        let result = engine.spark(ItemDetail::SrAndAbove, &mut rand::rng())?;
        report::print_result("Spark", &result, &self.cost_model.cost_of(SPARK_DRAWS));
        Ok(())
    }

    async fn roll_until(&self) -> Result<()> {
        let target = input("Item or character name").await?;
        let pinned = confirm("Keep the current banner instead of the target's own?").await?;
        let request = RollUntilRequest {
            target,
            promotion: pinned.then_some(self.promotion),
            season: if pinned { self.season } else { None },
            rate_ups: self.rate_ups.clone(),
        };

        let snapshot = self.cache.snapshot_fresh().await?;
        let roll = RollUntil::prepare(snapshot, request, self.env.roll_until_limits(), self.cost_model)?;
        if let Some(rate) = roll.target_rate() {
            println!("  {} drops at {:.4}% per draw", roll.target().display_name(), rate);
        }

        let spinner = ProgressBar::new_spinner();
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?);
        spinner.set_message(format!("rolling for {}", roll.target().display_name()));

        let outcome = roll.run_with_timeout().await;
        spinner.finish_and_clear();

        match outcome {
            Ok(outcome) => report::print_outcome(&outcome),
            Err(e @ (GachaError::NonConvergence { .. } | GachaError::Aborted { .. })) => {
                let draws = e.draws_so_far().unwrap_or_default();
                println!("\n{} {}", "Gave up:".red().bold(), e);
                println!("  {}", report::cost_line(&self.cost_model.cost_of(draws)).dimmed());
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    async fn show_rates(&self) -> Result<()> {
        let engine = self.engine().await?;
        println!("\n{}", self.banner_label().bold());
        report::print_rates(engine.buckets());
        Ok(())
    }

    async fn change_banner(&mut self) -> Result<()> {
        let promotions = Promotion::ALL;
        self.promotion = promotions[select("Promotion", &promotions).await?];

        let mut seasons = vec!["none".to_string()];
        seasons.extend(Season::ALL.iter().map(|s| s.to_string()));
        let picked = select("Season", &seasons).await?;
        self.season = picked.checked_sub(1).map(|i| Season::ALL[i]);
        Ok(())
    }

    async fn manage_rate_ups(&mut self) -> Result<()> {
        for entry in &self.rate_ups {
            println!("  {} at {}%", entry.item.display_name(), entry.rate);
        }

        match select("Rate-ups", &["Add", "Remove", "Clear", "Back"]).await? {
            0 => {
                let name = input("Item or character name").await?;
                let snapshot = self.cache.snapshot().await;
                let item = snapshot.find_by_name(&name).ok_or_else(|| anyhow!("no item named {:?}", name))?;
                let rate: f64 = input("Rate (% of all draws)").await?.parse().context("rate must be a number")?;

                if let Some(store) = &self.store {
                    store.upsert(&self.user_id, item.id, rate).await?;
                }
                self.rate_ups.retain(|r| r.item.id != item.id);
                self.rate_ups.push(RateUpEntry::new((*item).clone(), rate));
            }
            1 if !self.rate_ups.is_empty() => {
                let names: Vec<String> = self.rate_ups.iter().map(|r| r.item.display_name()).collect();
                let removed = self.rate_ups.remove(select("Remove which?", &names).await?);
                if let Some(store) = &self.store {
                    store.delete(&self.user_id, removed.item.id).await?;
                }
            }
            2 => {
                if let Some(store) = &self.store {
                    store.clear_user(&self.user_id).await?;
                }
                self.rate_ups.clear();
            }
            _ => {}
        }
        Ok(())
    }

    async fn dispatch(&mut self, action: usize) -> Result<bool> {
        match action {
            0 => self.single_draw().await?,
            1 => self.ten_draw().await?,
            2 => self.spark().await?,
            3 => self.roll_until().await?,
            4 => self.show_rates().await?,
            5 => self.change_banner().await?,
            6 => self.manage_rate_ups().await?,
            7 => {
                let snapshot = self.cache.refresh().await?;
                println!("  catalog reloaded, {} items", snapshot.len());
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    setup_tracing()?;

    let env = GachaEnv::load();
    let backend = select_backend(&env).await?;
    let cache = CatalogCache::load(backend.source, env.catalog_ttl()).await?;
    info!("[run] catalog from {}", backend.description);

    let user_id = std::env::var("GACHA_USER_ID").unwrap_or_else(|_| "sandbox".to_string());
    let rate_ups = match &backend.rate_ups {
        Some(store) => store.list_for_user(&user_id, &*cache.snapshot().await).await?,
        None => Vec::new(),
    };

    let mut sandbox = Sandbox {
        cost_model: env.cost_model(),
        env,
        cache,
        store: backend.rate_ups,
        user_id,
        promotion: Promotion::Premium,
        season: None,
        rate_ups,
    };

    loop {
        println!("\n{}", sandbox.banner_label().cyan());
        let action = select("What next?", ACTIONS).await?;
        match sandbox.dispatch(action).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                warn!("[run] {:#}", e);
                println!("{} {:#}", "Error:".red().bold(), e);
            }
        }
    }
    Ok(())
}

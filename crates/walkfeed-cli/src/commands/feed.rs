use serde::Serialize;
use walkfeed_core::{FoodItem, ResetOutcome};

use super::{print_json, CmdResult, Context};

#[derive(Serialize)]
struct FeedReport<'a> {
    item: &'a FoodItem,
    #[serde(flatten)]
    outcome: walkfeed_core::FeedOutcome,
}

pub fn feed(name: &str) -> CmdResult {
    let mut ctx = Context::open()?;
    let item = ctx
        .config
        .catalog
        .find(name)
        .cloned()
        .ok_or_else(|| format!("unknown food '{name}' (see `walkfeed catalog`)"))?;
    let outcome = ctx.economy.feed(&item);
    ctx.save()?;
    print_json(&FeedReport {
        item: &item,
        outcome,
    })
}

#[derive(Serialize)]
struct CatalogEntry<'a> {
    #[serde(flatten)]
    item: &'a FoodItem,
    affordable: bool,
}

pub fn catalog() -> CmdResult {
    let ctx = Context::open()?;
    let points = ctx.economy.state().hunger_points;
    let entries: Vec<_> = ctx
        .config
        .catalog
        .items()
        .iter()
        .map(|item| CatalogEntry {
            item,
            affordable: points >= item.price,
        })
        .collect();
    print_json(&entries)
}

pub fn reset() -> CmdResult {
    let mut ctx = Context::open()?;
    let outcome: ResetOutcome = ctx.economy.reset();
    if outcome.applied {
        ctx.save()?;
    }
    print_json(&outcome)
}

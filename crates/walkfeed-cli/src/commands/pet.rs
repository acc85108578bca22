use clap::Subcommand;
use serde::Serialize;
use walkfeed_core::{PetGender, PetIdentity, PetKind};

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum PetAction {
    /// Choose and name a pet
    Adopt {
        /// cat, pufferfish or chicken
        #[arg(long)]
        kind: PetKind,
        /// Pet name (1-20 characters)
        #[arg(long)]
        name: String,
        /// male, female or other
        #[arg(long)]
        gender: PetGender,
    },
    /// Show the current pet
    Show,
}

#[derive(Serialize)]
struct AdoptReport {
    adopted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    pet: Option<PetIdentity>,
}

pub fn run(action: PetAction) -> CmdResult {
    let mut ctx = Context::open()?;
    match action {
        PetAction::Adopt { kind, name, gender } => {
            let identity = PetIdentity::new(kind, &name, gender)?;
            let adopted = ctx.economy.adopt(identity);
            let reason = match (adopted, ctx.economy.is_dead()) {
                (true, _) => None,
                (false, true) => Some("pet is dead; run `walkfeed reset` first"),
                (false, false) => Some("a pet has already been adopted"),
            };
            if adopted {
                ctx.save()?;
            }
            print_json(&AdoptReport {
                adopted,
                reason,
                pet: ctx.economy.state().pet.clone(),
            })
        }
        PetAction::Show => print_json(&ctx.economy.state().pet),
    }
}

use poise::Command;

use crate::bot::Data;

pub mod admin_cog;
pub mod journal_cog;

pub use admin_cog::AdminCog;
pub use journal_cog::JournalCog;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

pub trait Cog {
    fn commands(&self) -> Vec<Command<Data, Error>>;
}

pub struct Cogs;

impl Cog for Cogs {
    fn commands(&self) -> Vec<Command<Data, Error>> {
        let journal_cog = JournalCog;
        let admin_cog = AdminCog;

        journal_cog
            .commands()
            .into_iter()
            .chain(admin_cog.commands())
            .collect()
    }
}

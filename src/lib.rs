//! quill-bot - A Discord bot for daily journaling reminders.
//!
//! This crate provides a Discord bot implementation with features including:
//! - Two reminder DMs per day at fixed local times
//! - Daily silence sweep with administrator escalation
//! - Subscription management via slash commands

pub mod bot;
pub mod config;
pub mod error;
pub mod event;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod repository;
pub mod service;
pub mod subscriber;
pub mod task;

//! Integration tests for the time-tracking record store.

#[path = "../common/mod.rs"]
mod common;

mod admin;
mod cascade;
mod duration;
mod durability;
mod listing;
mod primary_contact;
mod validation;

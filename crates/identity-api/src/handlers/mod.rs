//! HTTP handlers

pub mod account;
pub mod health;
pub mod home;
pub mod manage;
pub mod migrations;

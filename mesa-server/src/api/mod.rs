//! API routes
//!
//! - [`health`] - liveness
//! - [`auth`] - registration, login, own account
//! - [`users`] - user administration
//! - [`menu`] - categories and items
//! - [`tables`] - dining tables and availability
//! - [`reservations`] - bookings
//! - [`payments`] - EuPago payments and callback
//! - [`orders`] - POS orders
//! - [`finance`] - revenue reports
//! - [`settings`] - restaurant settings

pub mod auth;
pub mod finance;
pub mod health;
pub mod menu;
pub mod orders;
pub mod payments;
pub mod reservations;
pub mod settings;
pub mod tables;
pub mod users;

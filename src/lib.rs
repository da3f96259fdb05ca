// src/lib.rs
//
// Client-side core for the TaskPilot team task manager: data model, remote
// store adapter, the in-memory task store with optimistic board updates,
// view derivations, and the AI priority-suggestion client. Persistence,
// auth and the realtime change feed live in the backend; everything here
// reaches them through the `remote::RemoteStore` boundary only.

pub mod ai;
pub mod board;
pub mod calendar;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod memory;
pub mod models;
pub mod notify;
pub mod remote;
pub mod store;
pub mod supabase;

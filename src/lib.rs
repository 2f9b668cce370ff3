//! # Parkchase - Grid Chase Game Engine
//!
//! A player walks an N×N park collecting baskets while guards patrol fixed
//! axes. Getting within one cell of a guard loses the game; collecting the
//! board's basket goal wins it.
//!
//! ## Features
//!
//! - **Board Model**: Tagged pieces (player, guard, basket, tree) on a square grid with movement and collision rules.
//! - **Guard Patrol**: Guards walk their axis, turn around when blocked, and temporarily hide baskets they stand on.
//! - **Dual Timers**: Guard movement and the game clock tick independently on tokio; all state changes share one lock.
//! - **Plain-Text Saves**: One piece per line, atomic file replacement, and the remaining basket goal carried in the header.
//! - **Event Channel**: Field changes, progress and game-over notifications delivered in order to a single consumer.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parkchase::board::Direction;
//! use parkchase::config::Config;
//! use parkchase::engine::GameEngine;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let (engine, mut events) = GameEngine::from_config(&config.engine)?;
//!     engine.new_game("levels/easy.txt").await?;
//!     engine.step(Direction::Right)?;
//!     while let Ok(event) = events.try_recv() {
//!         println!("{event:?}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`board`] - Pieces, the grid, movement and guard patrol
//! - [`engine`] - Game session, tick scheduling and events
//! - [`storage`] - Board file codec and file store
//! - [`config`] - Configuration management and validation
//! - [`errors`] - Error types shared across modules
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐      ┌──────────────┐
//! │   Game Engine   │ ←──  │ Guard/Clock  │ ← tokio timers
//! │   (session)     │      │   Timers     │
//! └─────────────────┘      └──────────────┘
//!          │  events → observer
//! ┌─────────────────┐
//! │   Board         │ ← Pieces, movement, patrol
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   Storage       │ ← Text codec, atomic saves
//! └─────────────────┘
//! ```

pub mod board;
pub mod config;
pub mod engine;
pub mod errors;
pub mod storage;

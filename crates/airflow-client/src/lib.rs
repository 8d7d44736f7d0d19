//! HTTP client SDK for the Apache Airflow stable REST API.
//!
//! This crate provides a typed client for the subset of the Airflow API
//! needed to manage DAGs, DAG runs, variables, pools and roles.
//!
//! # Example
//!
//! ```no_run
//! use airflow_client::{AirflowClient, Result, TriggerDagRunRequest};
//!
//! # async fn example() -> Result<()> {
//! let client = AirflowClient::builder()
//!     .base_url("https://airflow.example.com")
//!     .bearer_token("secret")
//!     .build()?;
//!
//! let run = client
//!     .dag_runs()
//!     .trigger("sales_etl", &TriggerDagRunRequest::default())
//!     .await?;
//! println!("started {:?} in state {:?}", run.dag_run_id, run.state);
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **DAGs**: get, list, pause/unpause, delete
//! - **DAG runs**: trigger, get, list, delete
//! - **Variables**, **Pools**, **Roles**: full CRUD
//! - **Health**: metadatabase and scheduler status

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use client::{AirflowClient, Auth, ClientBuilder, DEFAULT_API_PATH};
pub use error::{Error, Result};
pub use types::*;

pub use api::{ListDagRunsQuery, PageQuery};

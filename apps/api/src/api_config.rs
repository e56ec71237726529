use std::env;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use gatehouse_application::ModuleCatalog;
use gatehouse_core::{AppError, RoleId};
use gatehouse_domain::{
    ModulePermissionGroup, Permission, PermissionKey, TeaserPolicy, TeaserStrategy,
};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

const MIN_BILLING_SECRET_LENGTH: usize = 32;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: Option<String>,
    pub api_host: String,
    pub api_port: u16,
    pub billing_shared_secret: String,
    pub bootstrap_admin_role: Option<RoleId>,
    pub catalog: ModuleCatalog,
    pub teaser_policy: TeaserPolicy,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let billing_shared_secret = required_non_empty_env("BILLING_SHARED_SECRET")?;
        if billing_shared_secret.len() < MIN_BILLING_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "BILLING_SHARED_SECRET must be at least {MIN_BILLING_SECRET_LENGTH} characters"
            )));
        }

        let bootstrap_admin_role = env::var("BOOTSTRAP_ADMIN_ROLE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(RoleId::new)
            .transpose()?;

        let catalog = match env::var("MODULE_CATALOG_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
        {
            Some(path) => {
                let contents = fs::read_to_string(&path).map_err(|error| {
                    AppError::Validation(format!(
                        "failed to read MODULE_CATALOG_PATH '{path}': {error}"
                    ))
                })?;
                parse_module_catalog(contents.as_str())?
            }
            None => ModuleCatalog::builtin()?,
        };

        let teaser_strategy = env::var("TEASER_STRATEGY")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| TeaserStrategy::from_str(value.trim()))
            .transpose()?
            .unwrap_or(TeaserStrategy::FirstNItems);
        let free_visible_count = match env::var("TEASER_FREE_VISIBLE_COUNT") {
            Ok(value) => value.trim().parse::<usize>().map_err(|error| {
                AppError::Validation(format!("invalid TEASER_FREE_VISIBLE_COUNT: {error}"))
            })?,
            Err(_) => 3,
        };

        Ok(Self {
            database_url,
            api_host,
            api_port,
            billing_shared_secret,
            bootstrap_admin_role,
            catalog,
            teaser_policy: TeaserPolicy {
                strategy: teaser_strategy,
                free_visible_count,
            },
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

#[derive(Debug, Deserialize)]
struct CatalogModuleEntry {
    module_id: String,
    module_name: String,
    permissions: Vec<CatalogPermissionEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogPermissionEntry {
    action: String,
    label: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    supports_scope: bool,
}

/// Parses a JSON array of module entries into a validated catalog.
pub fn parse_module_catalog(contents: &str) -> Result<ModuleCatalog, AppError> {
    let entries: Vec<CatalogModuleEntry> = serde_json::from_str(contents)
        .map_err(|error| AppError::Validation(format!("invalid module catalog: {error}")))?;

    let groups = entries
        .into_iter()
        .map(|entry| {
            let permissions = entry
                .permissions
                .into_iter()
                .map(|permission| {
                    Permission::new(
                        PermissionKey::new(entry.module_id.as_str(), permission.action)?,
                        permission.label,
                        permission.description,
                        permission.supports_scope,
                    )
                })
                .collect::<Result<Vec<_>, _>>()?;
            ModulePermissionGroup::new(entry.module_id, entry.module_name, permissions)
        })
        .collect::<Result<Vec<_>, _>>()?;

    ModuleCatalog::new(groups)
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

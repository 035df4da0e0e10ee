use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::domains::address::AccountAddress;
use crate::error::{AcmpError, Result};

pub const DEFAULT_MODULE: &str = "acmp";
pub const DEFAULT_RECEIVE_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Address the mailbox contract is published under.
    pub contract_address: String,
    pub module: Option<String>,
    /// Upper bound on mailbox entries decrypted at once.
    pub receive_concurrency: Option<usize>,
}

impl Config {
    pub fn new(contract_address: AccountAddress) -> Self {
        Self {
            contract_address: contract_address.to_string(),
            module: None,
            receive_concurrency: None,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| AcmpError::Config(e.to_string()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| AcmpError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.contract_address()?;
        if self.module().is_empty() {
            return Err(AcmpError::Config("module name must not be empty".to_string()));
        }
        if self.receive_concurrency() == 0 {
            return Err(AcmpError::Config(
                "receive_concurrency must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn contract_address(&self) -> Result<AccountAddress> {
        self.contract_address
            .parse()
            .map_err(|e: AcmpError| AcmpError::Config(e.to_string()))
    }

    pub fn module(&self) -> &str {
        self.module.as_deref().unwrap_or(DEFAULT_MODULE)
    }

    pub fn receive_concurrency(&self) -> usize {
        self.receive_concurrency.unwrap_or(DEFAULT_RECEIVE_CONCURRENCY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply() {
        let config = Config::new("0x1".parse().unwrap());
        assert_eq!(config.module(), "acmp");
        assert_eq!(config.receive_concurrency(), DEFAULT_RECEIVE_CONCURRENCY);
        config.validate().unwrap();
    }

    #[test]
    fn loads_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"contract_address": "0xb60f", "module": "mail", "receive_concurrency": 2}}"#
        )
        .unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.module(), "mail");
        assert_eq!(config.receive_concurrency(), 2);
        assert_eq!(
            config.contract_address().unwrap(),
            "0xb60f".parse::<AccountAddress>().unwrap()
        );
    }

    #[test]
    fn rejects_invalid_values() {
        let mut config = Config::new("0x1".parse().unwrap());
        config.receive_concurrency = Some(0);
        assert!(matches!(config.validate(), Err(AcmpError::Config(_))));

        config.receive_concurrency = None;
        config.contract_address = "not-hex".to_string();
        assert!(matches!(config.validate(), Err(AcmpError::Config(_))));

        config.contract_address = "0x1".to_string();
        config.module = Some(String::new());
        assert!(matches!(config.validate(), Err(AcmpError::Config(_))));

        assert!(matches!(
            Config::from_file("/nonexistent/acmp.json"),
            Err(AcmpError::Config(_))
        ));
    }
}

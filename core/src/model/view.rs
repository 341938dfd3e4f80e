use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use anyhow::{anyhow, Result};

/// Which list the user is looking at. Changes how undated tasks are bucketed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    All,
    Today,
}

impl Default for ActiveView {
    fn default() -> Self {
        ActiveView::Today
    }
}

impl fmt::Display for ActiveView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveView::All => write!(f, "All"),
            ActiveView::Today => write!(f, "Today"),
        }
    }
}

impl FromStr for ActiveView {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "all" | "tasks" => Ok(ActiveView::All),
            "today" => Ok(ActiveView::Today),
            _ => Err(anyhow!("Unknown view: '{}'", s)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workspace {
    Personal,
    Brief,
}

impl Default for Workspace {
    fn default() -> Self {
        Workspace::Brief
    }
}

impl Workspace {
    pub fn toggled(self) -> Self {
        match self {
            Workspace::Personal => Workspace::Brief,
            Workspace::Brief => Workspace::Personal,
        }
    }
}

impl fmt::Display for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Workspace::Personal => write!(f, "Personal"),
            Workspace::Brief => write!(f, "Brief"),
        }
    }
}

impl FromStr for Workspace {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "personal" => Ok(Workspace::Personal),
            "brief" => Ok(Workspace::Brief),
            _ => Err(anyhow!("Unknown workspace: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_parse() {
        assert_eq!("today".parse::<ActiveView>().unwrap(), ActiveView::Today);
        assert_eq!("All".parse::<ActiveView>().unwrap(), ActiveView::All);
        assert!("hot".parse::<ActiveView>().is_err());
    }

    #[test]
    fn test_workspace_toggle() {
        assert_eq!(Workspace::default().toggled(), Workspace::Personal);
        assert_eq!(Workspace::Personal.toggled(), Workspace::Brief);
    }
}

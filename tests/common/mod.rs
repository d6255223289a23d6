#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use scenario_matcher::browser::session::{Session, SessionLauncher};
use scenario_matcher::error::MatchError;
use scenario_matcher::page::element::Locator;
use scenario_matcher::scenario::parser::parse_scenario;
use scenario_matcher::scenario::suite::Scenario;
use scenario_matcher::scoring::vectors::InMemoryVectors;

// ============================================================================
// Word vectors
// ============================================================================

/// A 4-dimensional table small enough to reason about by hand.
pub fn vectors() -> InMemoryVectors {
    InMemoryVectors::new(4)
        .with("username", &[1.0, 1.0, 0.0, 0.0])
        .and_then(|v| v.with("user", &[1.0, 0.0, 0.0, 0.0]))
        .and_then(|v| v.with("name", &[0.0, 1.0, 0.0, 0.0]))
        .and_then(|v| v.with("password", &[0.0, 0.0, 0.0, 1.0]))
        .and_then(|v| v.with("login", &[0.0, 0.0, 1.0, 0.0]))
        .and_then(|v| v.with("search", &[0.0, 0.0, 1.0, 1.0]))
        .unwrap()
}

pub fn scenario(name: &str, lines: &[&str]) -> Scenario {
    parse_scenario(name, lines).unwrap()
}

// ============================================================================
// Scripted site + session
// ============================================================================

/// Canned pages and the behaviour of the fake browser on them.
#[derive(Debug, Default)]
pub struct FakeSite {
    /// url -> markup
    pub pages: HashMap<String, String>,
    /// clicked locator (`strategy=value`) -> url navigated to
    pub links: HashMap<String, String>,
    /// locators whose interactions fail
    pub failing: HashSet<String>,
    /// urls whose markup cannot be read
    pub broken: HashSet<String>,
}

impl FakeSite {
    pub fn page(mut self, url: &str, markup: &str) -> Self {
        self.pages.insert(url.to_string(), markup.to_string());
        self
    }

    pub fn link(mut self, locator: &str, url: &str) -> Self {
        self.links.insert(locator.to_string(), url.to_string());
        self
    }

    pub fn failing(mut self, locator: &str) -> Self {
        self.failing.insert(locator.to_string());
        self
    }

    pub fn broken(mut self, url: &str) -> Self {
        self.broken.insert(url.to_string());
        self
    }
}

/// Everything the fake browser was asked to do, across all sessions.
#[derive(Debug, Default)]
pub struct SessionLog {
    pub calls: Vec<String>,
    pub launches: usize,
    pub closes: usize,
}

pub type SharedLog = Rc<RefCell<SessionLog>>;

pub struct FakeSession {
    site: Rc<FakeSite>,
    log: SharedLog,
    current: String,
}

impl FakeSession {
    fn record(&self, call: String) {
        self.log.borrow_mut().calls.push(call);
    }

    fn check(&self, command: &str, locator: &Locator) -> Result<(), MatchError> {
        if self.site.failing.contains(&locator.to_string()) {
            return Err(MatchError::Interaction {
                command: command.into(),
                error: format!("element {} is not interactable", locator),
            });
        }
        Ok(())
    }
}

impl Session for FakeSession {
    fn open(&mut self, url: &str) -> Result<(), MatchError> {
        self.record(format!("open {}", url));
        self.current = url.to_string();
        Ok(())
    }

    fn enter(&mut self, locator: &Locator, value: &str) -> Result<(), MatchError> {
        self.record(format!("enter {} {}", locator, value));
        self.check("enter", locator)
    }

    fn select(&mut self, locator: &Locator, value: &str) -> Result<(), MatchError> {
        self.record(format!("select {} {}", locator, value));
        self.check("select", locator)
    }

    fn click(&mut self, locator: &Locator) -> Result<(), MatchError> {
        self.record(format!("click {}", locator));
        self.check("click", locator)?;
        if let Some(url) = self.site.links.get(&locator.to_string()) {
            self.current = url.clone();
        }
        Ok(())
    }

    fn read_markup(&mut self) -> Result<String, MatchError> {
        self.record("markup".to_string());
        if self.site.broken.contains(&self.current) {
            return Err(MatchError::SessionIO(format!("{} crashed", self.current)));
        }
        Ok(self.site.pages.get(&self.current).cloned().unwrap_or_default())
    }

    fn close(&mut self) -> Result<(), MatchError> {
        self.log.borrow_mut().closes += 1;
        Ok(())
    }
}

pub struct FakeLauncher {
    pub site: Rc<FakeSite>,
    pub log: SharedLog,
}

impl FakeLauncher {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site: Rc::new(site),
            log: SharedLog::default(),
        }
    }

    pub fn launches(&self) -> usize {
        self.log.borrow().launches
    }

    pub fn closes(&self) -> usize {
        self.log.borrow().closes
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.borrow().calls.clone()
    }
}

impl SessionLauncher for FakeLauncher {
    fn launch(&mut self) -> Result<Box<dyn Session>, MatchError> {
        self.log.borrow_mut().launches += 1;
        Ok(Box::new(FakeSession {
            site: Rc::clone(&self.site),
            log: Rc::clone(&self.log),
            current: String::new(),
        }))
    }
}

// ============================================================================
// Pages
// ============================================================================

pub const LOGIN_URL: &str = "http://app.test/login";
pub const HOME_URL: &str = "http://app.test/home";

pub const LOGIN_PAGE: &str = r#"<html><head><title>Login</title></head><body>
<form>
  <input type="text" name="user_name">
  <input type="password" name="password">
  <button id="submitBtn">Login</button>
</form>
</body></html>"#;

pub const HOME_PAGE: &str = r#"<html><head><title>Home</title></head><body>
<input type="text" id="q" name="search">
<a href="/logout">Logout</a>
</body></html>"#;

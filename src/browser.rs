//! Browser capability surface and its headless Chrome implementation.
//!
//! The scrape logic depends only on the narrow [`ChannelPage`] trait —
//! navigate, wait for a selector, run a script, sleep, read the page HTML —
//! not on any specific browser engine. [`ChromeTab`] is the production
//! implementation over `headless_chrome`; tests substitute an in-memory fake
//! that returns canned HTML.

use headless_chrome::{Browser, LaunchOptionsBuilder, Tab};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// What the scrape needs from a loaded browser page.
///
/// Every method is synchronous and blocking; the only blocking points of a
/// run are navigation, waiting for the grid selector, and the settle delay.
pub trait ChannelPage {
    /// Load `url` and block until navigation completes.
    fn navigate(&self, url: &str) -> Result<(), Box<dyn Error>>;

    /// Block until an element matching `selector` is present.
    fn wait_for_selector(&self, selector: &str) -> Result<(), Box<dyn Error>>;

    /// Run a script in the page (used for the fixed lazy-load scroll).
    fn evaluate(&self, script: &str) -> Result<(), Box<dyn Error>>;

    /// Sleep for a fixed settle delay.
    fn wait(&self, duration: Duration);

    /// The current page HTML.
    fn content(&self) -> Result<String, Box<dyn Error>>;
}

/// A `headless_chrome` tab implementing [`ChannelPage`].
///
/// The browser process lives as long as this value; dropping it closes the
/// browser.
pub struct ChromeTab {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeTab {
    /// Launch a headless browser with a 1920x1080 viewport and open a tab.
    ///
    /// `timeout` bounds navigation and every selector wait on the tab.
    pub fn launch(timeout: Duration) -> Result<Self, Box<dyn Error>> {
        info!(?timeout, "Launching headless browser");
        let browser = Browser::new(
            LaunchOptionsBuilder::default()
                .window_size(Some((1920, 1080)))
                .build()?,
        )?;
        let tab = browser.new_tab()?;
        tab.set_default_timeout(timeout);
        tab.set_user_agent(USER_AGENT, None, None)?;
        Ok(ChromeTab {
            _browser: browser,
            tab,
        })
    }
}

impl ChannelPage for ChromeTab {
    fn navigate(&self, url: &str) -> Result<(), Box<dyn Error>> {
        info!(%url, "Navigating");
        self.tab.navigate_to(url)?;
        self.tab.wait_until_navigated()?;
        Ok(())
    }

    fn wait_for_selector(&self, selector: &str) -> Result<(), Box<dyn Error>> {
        debug!(%selector, "Waiting for selector");
        self.tab.wait_for_element(selector)?;
        Ok(())
    }

    fn evaluate(&self, script: &str) -> Result<(), Box<dyn Error>> {
        debug!(%script, "Evaluating script");
        self.tab.evaluate(script, false)?;
        Ok(())
    }

    fn wait(&self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn content(&self) -> Result<String, Box<dyn Error>> {
        Ok(self.tab.get_content()?)
    }
}

//! Topic help pages
//!
//! `--help` is rendered by clap. The pages here cover what clap cannot:
//! `config` documents the properties file keys, `env` the run-parameter
//! variables, and `output` the report and chart artifacts.

use crate::config::{env::EnvManager, PROPERTY_KEYS};
use crate::defaults;
use colored::*;

/// Topics accepted by `--help-topic`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum HelpTopic {
    /// Properties file keys
    Config,
    /// Environment variables and .env file
    Env,
    /// Report and chart artifacts
    Output,
}

/// Text appended to clap's `--help`
pub const TOPICS_FOOTER: &str = "More help: smbp --help-topic <config|env|output>";

const KEY_DESCRIPTIONS: [&str; 7] = [
    "Host name or IP address of the SMB server",
    "Account used to authenticate",
    "Password for the account",
    "Authentication domain (not used by the SMB1 family)",
    "Share name, without slashes",
    "File probed by exists() and length(), relative to the share",
    "Directory probed by isDirectory(), relative to the share",
];

/// Renders topic pages, with or without color
pub struct HelpSystem {
    families: &'static str,
}

impl HelpSystem {
    pub fn new() -> Self {
        Self {
            families: env!("PROTOCOL_FAMILIES"),
        }
    }

    pub fn display_topic_help(&self, topic: HelpTopic, use_colors: bool) -> String {
        let page = Page::new(use_colors);
        match topic {
            HelpTopic::Config => self.config_page(page),
            HelpTopic::Env => self.env_page(page),
            HelpTopic::Output => self.output_page(page),
        }
    }

    /// Short usage text printed after an invalid invocation
    pub fn usage(&self) -> String {
        "Usage: smbp [OPTIONS] <CONFIG_FILE>\n\nRun 'smbp --help' for the list of options.\n".to_string()
    }

    fn config_page(&self, mut page: Page) -> String {
        page.heading("PROPERTIES FILE");
        page.line("The single positional argument names a properties file.");
        page.line("Lines are key=value (':' or whitespace also separate); '#' and '!' start comments;");
        page.line("a trailing backslash continues a value on the next line.");

        page.heading("REQUIRED KEYS");
        for (key, description) in PROPERTY_KEYS.iter().zip(KEY_DESCRIPTIONS) {
            page.entry(key, description);
        }

        page.heading("EXAMPLE");
        for line in [
            "smb.server_address=fs01.corp.local",
            "smb.username=svc_profiler",
            "smb.password=********",
            "smb.domain=CORP",
            "smb.share_name=exchange",
            "smb.file_name=inbound/report.docx",
            "smb.dir_name=Shared",
        ] {
            page.line(&format!("  {}", line));
        }

        page.blank();
        page.line("An empty or missing key stops the run before any connection is made.");
        page.finish()
    }

    fn env_page(&self, mut page: Page) -> String {
        page.heading("RUN PARAMETERS");
        page.line("Command-line flags win over the environment, which wins over .env values.");
        page.line("The .env file is read from the working directory before the flags are parsed.");

        page.heading("VARIABLES");
        for (name, description, example) in EnvManager::get_supported_env_vars() {
            page.entry(name, &format!("{} (e.g. {})", description, example));
        }
        page.line(&format!("Protocol families: {}", self.families));

        page.heading("EXAMPLE .env FILE");
        page.raw(&EnvManager::create_example_env_content());
        page.finish()
    }

    fn output_page(&self, mut page: Page) -> String {
        page.heading("ARTIFACTS");
        page.entry(
            "report",
            &format!(
                "{}<dd_MM_yy_HH_mm_ss_SSS>.{} in the working directory, or --output <PATH>",
                defaults::REPORT_FILE_PREFIX,
                defaults::REPORT_FILE_EXTENSION
            ),
        );
        page.entry(
            "chart",
            &format!(
                "same base name with the .{} extension ({}x{})",
                defaults::CHART_FILE_EXTENSION,
                defaults::CHART_WIDTH,
                defaults::CHART_HEIGHT
            ),
        );
        page.line("An existing report file is appended to, never truncated.");

        page.heading("REPORT LAYOUT");
        page.line("  [Run i] block with the Exists, IsDirectory and Length call times");
        page.line("  <<Average times>> block with the integer mean of each call");

        page.heading("TIMING");
        page.line("Each call opens its own connection. Its time covers connect, authenticate,");
        page.line("mount and the check itself, but not the teardown.");
        page.line(&format!(
            "Pauses of {}s, {}s and {}s separate the calls and iterations.",
            defaults::EXISTS_TO_IS_DIRECTORY_DELAY.as_secs(),
            defaults::IS_DIRECTORY_TO_LENGTH_DELAY.as_secs(),
            defaults::BETWEEN_ITERATIONS_DELAY.as_secs()
        ));

        page.heading("CONSOLE");
        page.line("A min/avg/max summary table is printed after the report is written.");
        page.line("--no-color or NO_COLOR disables colors.");
        page.finish()
    }
}

impl Default for HelpSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Line-oriented page builder
struct Page {
    text: String,
    use_colors: bool,
}

impl Page {
    fn new(use_colors: bool) -> Self {
        Self {
            text: String::new(),
            use_colors,
        }
    }

    fn heading(&mut self, title: &str) {
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        let title = format!("{}:", title);
        if self.use_colors {
            self.text.push_str(&title.bright_green().bold().to_string());
        } else {
            self.text.push_str(&title);
        }
        self.text.push('\n');
    }

    fn entry(&mut self, name: &str, description: &str) {
        let name = format!("{:<20}", name);
        if self.use_colors {
            self.text.push_str(&format!("  {} {}\n", name.bright_yellow(), description));
        } else {
            self.text.push_str(&format!("  {} {}\n", name, description));
        }
    }

    fn line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
    }

    fn raw(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn blank(&mut self) {
        self.text.push('\n');
    }

    fn finish(self) -> String {
        self.text
    }
}

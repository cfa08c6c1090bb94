//! # Shell Commands
//!
//! Each input line is split on whitespace and parsed with clap, so `help`
//! and `<command> --help` work as usual.
//!
//! Products shown by any listing are remembered, which lets `add <id>`
//! put them into the cart by id.

use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use storefront_client::{AppContainer, ClientError, SearchPipeline, SearchResults};
use storefront_core::settings::{ONBOARDING_BRANDS, ONBOARDING_CATEGORIES};
use storefront_core::{
    Category, CurrencyCode, Credentials, LoadState, OnboardingPreferences, OnboardingStatus,
    Product, ProfileUpdate, SortOption,
};

/// Longest time `search` waits for the debounced result.
const SEARCH_WAIT: Duration = Duration::from_secs(30);

#[derive(Debug, Parser)]
#[command(name = "storefront", no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    // =========================================================================
    // Catalog
    // =========================================================================
    /// List all categories
    Categories,
    /// List products of a category
    Products { category: String },
    /// Show the home feed
    Home,
    /// Products similar to a product
    Similar { product_id: String },

    // =========================================================================
    // Search
    // =========================================================================
    /// Search (debounced like typing)
    Search { words: Vec<String> },
    /// Run a history entry or suggestion immediately
    Suggest { words: Vec<String> },
    /// Set or clear the category filter
    Category { id: Option<String> },
    /// Set the price filter
    Price {
        #[arg(long)]
        min: Option<f64>,
        #[arg(long)]
        max: Option<f64>,
    },
    /// Set or clear the size filter
    Size { size: Option<String> },
    /// Change result order (relevance, price_asc, price_desc, newest, name)
    Sort { option: SortOption },
    /// Search again with the current inputs
    Retry,
    /// Show search history
    History,
    /// Forget search history
    ClearHistory,
    /// Show suggested queries
    Popular,

    // =========================================================================
    // Account
    // =========================================================================
    Login { email: String, password: String },
    Register { email: String, password: String },
    Logout,
    /// Show the logged-in profile
    Profile,
    /// Change account email and/or password
    UpdateProfile {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },

    // =========================================================================
    // Cart
    // =========================================================================
    /// Show the cart
    Cart,
    /// Add a listed product to the cart
    Add {
        product_id: String,
        #[arg(default_value_t = 1)]
        quantity: u32,
    },
    Inc { product_id: String },
    Dec { product_id: String },
    Remove { product_id: String },
    /// Place an order for the cart
    Order,

    // =========================================================================
    // Settings
    // =========================================================================
    /// Set UI language (en, ru, uk, pl, or "system")
    Language { tag: String },
    /// Set display currency (UAH, USD, EUR)
    Currency { code: CurrencyCode },
    /// Show or change onboarding answers
    Onboarding {
        #[command(subcommand)]
        action: OnboardingAction,
    },

    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Subcommand)]
enum OnboardingAction {
    Show,
    Skip,
    Reset,
    Save {
        #[arg(long = "category")]
        categories: Vec<String>,
        #[arg(long = "brand")]
        brands: Vec<String>,
        #[arg(long)]
        min: Option<f64>,
        #[arg(long)]
        max: Option<f64>,
    },
}

enum Flow {
    Continue,
    Quit,
}

/// Reads commands from stdin until `quit` or end of input.
pub async fn run_prompt(app: &AppContainer) -> anyhow::Result<()> {
    let mut shell = Shell {
        app,
        seen: HashMap::new(),
    };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("storefront shell. Type `help` for commands.");
    loop {
        print!("> ");
        std::io::stdout().flush().context("flushing stdout")?;

        let Some(line) = lines.next_line().await.context("reading stdin")? else {
            break;
        };
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        let parsed = match Line::try_parse_from(words) {
            Ok(parsed) => parsed,
            Err(e) => {
                // Covers `help` and `--help` as well as mistakes.
                let _ = e.print();
                continue;
            }
        };

        debug!(command = ?parsed.command, "Running command");
        match shell.execute(parsed.command).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => {
                println!("error: {:#}", e);
                if let Some(hint) = hint(&e) {
                    println!("hint: {}", hint);
                }
            }
        }
    }

    Ok(())
}

struct Shell<'a> {
    app: &'a AppContainer,
    seen: HashMap<String, Product>,
}

impl Shell<'_> {
    async fn execute(&mut self, command: Command) -> anyhow::Result<Flow> {
        let app = self.app;

        match command {
            Command::Categories => match app.catalog.categories().await {
                LoadState::Success(categories) => print_categories(&categories),
                other => report_failure(&other),
            },
            Command::Products { category } => {
                let view = app.catalog.product_list(&category).await;
                if !view.chips.is_empty() {
                    let chips: Vec<&str> = view.chips.iter().map(|c| c.id.as_str()).collect();
                    println!("filters: {}", chips.join(" | "));
                }
                self.show_products(&view.products);
            }
            Command::Home => match app.home().await {
                LoadState::Success(home) => {
                    println!("== New arrivals");
                    self.print_products(&home.new_arrivals);
                    if !home.recommended.is_empty() {
                        println!("== Recommended for you");
                        self.print_products(&home.recommended);
                    }
                    if !home.popular.is_empty() {
                        println!("== Popular");
                        self.print_products(&home.popular);
                    }
                }
                other => report_failure(&other),
            },
            Command::Similar { product_id } => {
                let similar = app.catalog.similar_products(&product_id).await;
                self.show_products(&similar);
            }

            Command::Search { words } => {
                self.search_and_show(|search| search.set_query(words.join(" ")))
                    .await?
            }
            Command::Suggest { words } => {
                self.search_and_show(|search| search.apply_suggestion(words.join(" ")))
                    .await?
            }
            Command::Category { id } => app.search.select_category(id),
            Command::Price { min, max } => {
                storefront_core::validation::validate_price_range(min, max)?;
                app.search.update_price_range(min, max);
            }
            Command::Size { size } => app.search.select_size(size),
            Command::Sort { option } => {
                if app.search.inputs().filters.sort_option == option {
                    println!("already sorted by {}", option);
                } else {
                    self.search_and_show(|search| search.select_sort(option))
                        .await?
                }
            }
            Command::Retry => self.search_and_show(SearchPipeline::retry).await?,
            Command::History => {
                for (i, entry) in app.search.history().iter().enumerate() {
                    println!("{:>2}. {}", i + 1, entry);
                }
            }
            Command::ClearHistory => app.search.clear_history(),
            Command::Popular => {
                for key in app.search.popular_queries() {
                    println!("  {}", key);
                }
            }

            Command::Login { email, password } => {
                app.session.login(Credentials::new(email, password)).await?;
                app.session.reset_status();
                println!("logged in");
            }
            Command::Register { email, password } => {
                app.session
                    .register(Credentials::new(email, password))
                    .await?;
                app.session.reset_status();
                println!("registered, you can log in now");
            }
            Command::Logout => {
                app.session.logout().await?;
                println!("logged out");
            }
            Command::Profile => match app.session.profile() {
                Some(profile) => println!("#{} {} (since {})", profile.id, profile.email, profile.created_at),
                None if app.session.is_authenticated() => println!("profile is loading"),
                None => println!("not logged in"),
            },
            Command::UpdateProfile { email, password } => {
                let update = ProfileUpdate {
                    email,
                    password: password.map(Into::into),
                };
                let profile = app.session.update_profile(update).await?;
                println!("updated: {}", profile.email);
            }

            Command::Cart => self.print_cart(),
            Command::Add {
                product_id,
                quantity,
            } => {
                let product = self.seen.get(&product_id).cloned().ok_or_else(|| {
                    anyhow!("unknown product {}; list or search for it first", product_id)
                })?;
                app.cart.add_item(&product, quantity).await?;
                self.print_cart();
            }
            Command::Inc { product_id } => {
                app.cart.increment(&product_id).await?;
                self.print_cart();
            }
            Command::Dec { product_id } => {
                app.cart.decrement(&product_id).await?;
                self.print_cart();
            }
            Command::Remove { product_id } => {
                app.cart.remove(&product_id).await?;
                self.print_cart();
            }
            Command::Order => {
                let order = app.cart.place_order().await?;
                println!(
                    "order #{} placed: {} items, total {}",
                    order.id,
                    order.items.len(),
                    app.currency.format_price(order.total_amount)
                );
            }

            Command::Language { tag } => {
                app.language.set_from_str(&tag).await?;
                match app.language.current() {
                    Some(tag) => println!("language: {}", tag),
                    None => println!("language: system"),
                }
            }
            Command::Currency { code } => {
                app.currency.set(code).await?;
                println!("currency: {}", code);
            }
            Command::Onboarding { action } => self.onboarding(action).await?,

            Command::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    async fn onboarding(&self, action: OnboardingAction) -> anyhow::Result<()> {
        let settings = &self.app.onboarding;
        match action {
            OnboardingAction::Show => {
                match settings.completion() {
                    OnboardingStatus::NotCompleted => println!("onboarding not completed"),
                    OnboardingStatus::Completed(prefs) => {
                        let categories: Vec<&str> =
                            prefs.selected_categories.iter().map(String::as_str).collect();
                        let brands: Vec<&str> =
                            prefs.selected_brands.iter().map(String::as_str).collect();
                        println!("categories: {}", categories.join(", "));
                        println!("brands:     {}", brands.join(", "));
                        println!("price:      {} - {}", prefs.min_price, prefs.max_price);
                    }
                }
                println!(
                    "choices:    --category {} | --brand {}",
                    ONBOARDING_CATEGORIES.join("/"),
                    ONBOARDING_BRANDS.join("/")
                );
            }
            OnboardingAction::Skip => settings.skip().await?,
            OnboardingAction::Reset => settings.reset().await?,
            OnboardingAction::Save {
                categories,
                brands,
                min,
                max,
            } => {
                check_choices("category", &categories, &ONBOARDING_CATEGORIES)?;
                check_choices("brand", &brands, &ONBOARDING_BRANDS)?;
                let mut prefs = OnboardingPreferences::default();
                for id in &categories {
                    prefs.toggle_category(id);
                }
                for id in &brands {
                    prefs.toggle_brand(id);
                }
                if let Some(min) = min {
                    prefs.min_price = min;
                }
                if let Some(max) = max {
                    prefs.max_price = max;
                }
                settings.save(prefs).await?;
            }
        }
        Ok(())
    }

    /// Runs a search action and prints the result it settles on.
    async fn search_and_show(
        &mut self,
        action: impl FnOnce(&SearchPipeline),
    ) -> anyhow::Result<()> {
        let mut rx = self.app.search.subscribe();
        drop(rx.borrow_and_update());
        action(&self.app.search);
        let results = wait_for_results(&mut rx).await?;
        self.show_products(&results);
        Ok(())
    }

    // =========================================================================
    // Output
    // =========================================================================

    fn remember(&mut self, products: &[Product]) {
        for product in products {
            self.seen.insert(product.id.clone(), product.clone());
        }
    }

    fn print_products(&mut self, products: &[Product]) {
        self.remember(products);
        if products.is_empty() {
            println!("  (nothing found)");
            return;
        }
        for product in products {
            let marker = if product.is_bestseller { " *" } else { "" };
            println!(
                "  {:<12} {:<40} {:>10}{}",
                product.id,
                product.name,
                self.app.currency.format_price(product.price),
                marker
            );
        }
    }

    fn show_products(&mut self, state: &LoadState<Vec<Product>>) {
        match state {
            LoadState::Success(products) => self.print_products(products),
            other => report_failure(other),
        }
    }

    fn print_cart(&self) {
        let lines = self.app.cart.lines();
        if lines.is_empty() {
            println!("cart is empty");
            return;
        }
        let currency = &self.app.currency;
        for line in &lines {
            println!(
                "  {:<12} {:<40} x{:<4} {:>10}",
                line.product_id(),
                line.product.name,
                line.quantity,
                currency.format_price(line.line_total())
            );
        }
        println!("  total: {}", currency.format_price(self.app.cart.total()));
    }
}

fn print_categories(categories: &[Category]) {
    for top in categories.iter().filter(|c| c.is_top_level()) {
        println!("{:<12} {}", top.id, top.name);
        for child in categories
            .iter()
            .filter(|c| c.parent_id.as_deref() == Some(top.id.as_str()))
        {
            println!("  {:<10} {}", child.id, child.name);
        }
    }
}

fn report_failure<T>(state: &LoadState<T>) {
    match state {
        LoadState::Error(message) => {
            debug!(%message, "Request failed");
            println!("something went wrong, try again");
        }
        LoadState::Loading => println!("still loading"),
        LoadState::Success(_) => {}
    }
}

fn check_choices(kind: &str, picked: &[String], offered: &[&str]) -> anyhow::Result<()> {
    match picked.iter().find(|id| !offered.contains(&id.as_str())) {
        Some(id) => bail!("unknown {} `{}`, choose from {}", kind, id, offered.join(", ")),
        None => Ok(()),
    }
}

/// What the user can do about a failed command, when there is anything.
pub(crate) fn hint(err: &anyhow::Error) -> Option<&'static str> {
    let err = err.downcast_ref::<ClientError>()?;
    if err.is_config_error() {
        Some("check storefront.toml and the STOREFRONT_* variables")
    } else if err.is_auth_failure() {
        Some("log in and try again")
    } else if err.is_not_found() {
        Some("the shop no longer has it, list products again")
    } else if err.is_retryable() {
        Some("the shop did not answer, try again")
    } else {
        None
    }
}

/// Waits until the search pipeline settles on a result.
async fn wait_for_results(
    rx: &mut tokio::sync::watch::Receiver<SearchResults>,
) -> anyhow::Result<SearchResults> {
    let settled = tokio::time::timeout(SEARCH_WAIT, async {
        loop {
            rx.changed().await?;
            let state = rx.borrow_and_update().clone();
            if !state.is_loading() {
                return Ok::<_, tokio::sync::watch::error::RecvError>(state);
            }
        }
    })
    .await;

    match settled {
        Ok(Ok(state)) => Ok(state),
        Ok(Err(_)) => bail!("search pipeline stopped"),
        Err(_) => bail!("search timed out"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        Line::try_parse_from(line.split_whitespace()).unwrap().command
    }

    #[test]
    fn test_parses_cart_commands() {
        assert!(matches!(
            parse("add p-1"),
            Command::Add { ref product_id, quantity: 1 } if product_id == "p-1"
        ));
        assert!(matches!(parse("add p-1 3"), Command::Add { quantity: 3, .. }));
        assert!(matches!(parse("exit"), Command::Quit));
    }

    #[test]
    fn test_parses_typed_arguments() {
        assert!(matches!(
            parse("sort price_desc"),
            Command::Sort {
                option: SortOption::PriceHighToLow
            }
        ));
        assert!(matches!(
            parse("currency usd"),
            Command::Currency {
                code: CurrencyCode::Usd
            }
        ));
        assert!(matches!(
            parse("price --min 10 --max 50"),
            Command::Price {
                min: Some(_),
                max: Some(_)
            }
        ));
        assert!(Line::try_parse_from(["sort", "cheapest"]).is_err());
    }

    #[test]
    fn test_parses_onboarding_save() {
        let Command::Onboarding {
            action: OnboardingAction::Save {
                categories, brands, ..
            },
        } = parse("onboarding save --category women --category kids --brand nord")
        else {
            panic!("expected onboarding save");
        };
        assert_eq!(categories, ["women", "kids"]);
        assert_eq!(brands, ["nord"]);
    }

    #[test]
    fn test_onboarding_choices_must_be_offered() {
        let picked = vec!["women".to_string(), "kids".to_string()];
        assert!(check_choices("category", &picked, &ONBOARDING_CATEGORIES).is_ok());

        let picked = vec!["nord".to_string(), "gucci".to_string()];
        let err = check_choices("brand", &picked, &ONBOARDING_BRANDS).unwrap_err();
        assert!(err.to_string().contains("gucci"));
    }

    #[test]
    fn test_hints_follow_error_kind() {
        let err = anyhow::Error::new(ClientError::Api {
            status: 503,
            message: "down".into(),
        });
        assert_eq!(hint(&err), Some("the shop did not answer, try again"));

        let err = anyhow::Error::new(ClientError::NotAuthenticated).context("placing order");
        assert_eq!(hint(&err), Some("log in and try again"));

        let err = anyhow::Error::new(ClientError::InvalidConfig("bad".into()));
        assert!(hint(&err).unwrap().contains("storefront.toml"));

        assert_eq!(hint(&anyhow!("search timed out")), None);
    }

    #[test]
    fn test_search_collects_words() {
        let Command::Search { words } = parse("search red running shoes") else {
            panic!("expected search");
        };
        assert_eq!(words.join(" "), "red running shoes");
    }
}

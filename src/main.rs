// Main entry point
use aveo::application::admin::SupplierAction;
use aveo::domain::params::{
    AnalyticsParams, ChartParams, OrderFilter, PageParams, ProductFilter, SearchRequest,
    SupplierFilter, TopProductsParams,
};
use aveo::infrastructure::config::{self, load_config, Logging};
use aveo::infrastructure::storage::SqliteStore;
use aveo::interfaces::cli::{AdminCommand, CartCommand, Cli, Command, WishlistCommand};
use aveo::presentation::format;
use aveo::presentation::theme::Theme;
use aveo::state::AppState;
use clap::Parser;
use colored::Colorize;
use serde::Serialize;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("Failed to listen for shutdown signal: {}", e);
        } else {
            eprintln!("\nInterrupted, shutting down...");
            let _ = shutdown_tx.send(());
        }
    });

    let cli = Cli::parse();
    let mut config = load_config()?;
    if cli.no_cache {
        config.cache_ttl_secs = 0;
    }

    if config.logging.enable {
        init_logging(&config.logging)?;
    }

    if matches!(cli.command, Command::GenerateConfig) {
        config::generate_config_sample()?;
        return Ok(());
    }

    let db_path = config::get_database_path(&config);
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let store = Arc::new(SqliteStore::open(&db_path).await?);

    let state = AppState::new(config, store.clone())?;
    state.restore_session().await?;

    let theme_name = cli.theme.as_deref().unwrap_or(state.config.theme.as_str());
    let out = Output {
        theme: Theme::from_name(theme_name),
        json: cli.json,
    };

    tokio::select! {
        result = run(&state, &store, &out, cli.command) => result,
        _ = shutdown_rx => {
            eprintln!("Operation interrupted");
            Ok(())
        }
    }
}

struct Output {
    theme: Theme,
    json: bool,
}

impl Output {
    fn value<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// JSON when asked for, otherwise the formatted text.
    fn either<T: Serialize>(&self, value: &T, text: impl FnOnce(&Theme) -> String) -> anyhow::Result<()> {
        if self.json {
            self.value(value)
        } else {
            print!("{}", text(&self.theme));
            Ok(())
        }
    }
}

async fn run(
    state: &AppState,
    store: &SqliteStore,
    out: &Output,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            state.login(&email, &password).await?;
            println!("{}", format!("Logged in as {}", email).green());
        }
        Command::Logout => {
            state.logout().await?;
            println!("Logged out");
        }
        Command::Whoami => {
            let profile = state.storefront.profile().await?;
            out.either(&profile, |theme| {
                format!("{} <{}>\n", (theme.title)(&profile.name), profile.email)
            })?;
        }
        Command::Products {
            page,
            limit,
            category,
        } => {
            let params = SearchRequest {
                page: Some(page),
                limit: Some(limit),
                category_id: category,
                ..Default::default()
            };
            let result = state.storefront.products(&params).await?;
            let title = format!("Products (page {} of {}, {} total)", result.page, result.total_pages, result.total);
            out.either(&result, |theme| {
                format::format_products(&title, &result.data, theme)
            })?;
        }
        Command::Product { id } => {
            let product = state.storefront.product(&id).await?;
            if out.json {
                out.value(&product)?;
            } else {
                print!(
                    "{}",
                    format::format_products(&product.name, std::slice::from_ref(&product), &out.theme)
                );
                if let Some(description) = &product.description {
                    println!("\n  {}", description);
                }
            }
        }
        Command::Search { query } => {
            let query = query.join(" ");
            if query.trim().is_empty() {
                anyhow::bail!("Please provide a search query");
            }
            let result = state
                .storefront
                .search(&query, &SearchRequest::default())
                .await?;
            out.either(&result, |theme| {
                format::format_products(&format!("Results for \"{}\"", query), &result.data, theme)
            })?;
        }
        Command::Trending { limit } => {
            let products = state.storefront.trending(limit).await?;
            out.either(&products, |theme| {
                format::format_products("Trending", &products, theme)
            })?;
        }
        Command::Categories => {
            let categories = state.storefront.categories().await?;
            out.either(&categories, |theme| {
                let mut text = format!("{}\n", (theme.title)("Categories"));
                for category in &categories {
                    text.push_str(&format!("  {}  {}\n", category.name, (theme.muted)(&category.id)));
                    for child in &category.children {
                        text.push_str(&format!("    {}  {}\n", child.name, (theme.muted)(&child.id)));
                    }
                }
                text
            })?;
        }
        Command::Cart(cmd) => run_cart(state, out, cmd).await?,
        Command::Wishlist(cmd) => run_wishlist(state, out, cmd).await?,
        Command::Addresses => {
            let addresses = state.storefront.addresses().await?;
            out.either(&addresses, |theme| {
                let mut text = format!("{}\n", (theme.title)("Addresses"));
                for address in &addresses {
                    text.push_str(&format!(
                        "  {}  {} {}, {}, {} {}\n",
                        (theme.muted)(&address.id),
                        address.first_name,
                        address.last_name,
                        address.address_line_1,
                        address.postal_code,
                        address.city
                    ));
                }
                text
            })?;
        }
        Command::Orders { page, limit } => {
            let orders = state
                .storefront
                .orders(&PageParams::new(page, limit))
                .await?;
            out.either(&orders, |theme| {
                let mut text = format!("{}\n", (theme.title)("Orders"));
                for order in &orders.data {
                    text.push_str(&format!(
                        "  {}  {}  {}\n",
                        (theme.muted)(&order.id),
                        order.status,
                        (theme.price)(&format!("{:.2}", order.total_amount))
                    ));
                }
                text
            })?;
        }
        Command::Admin(cmd) => run_admin(state, out, cmd).await?,
        Command::Status => print_status(state, store).await?,
        Command::GenerateConfig => config::generate_config_sample()?,
    }

    Ok(())
}

async fn run_cart(state: &AppState, out: &Output, cmd: CartCommand) -> anyhow::Result<()> {
    let cart = match cmd {
        CartCommand::Show => state.cart.get_cart().await?,
        CartCommand::Add {
            product_id,
            quantity,
        } => {
            let product = state.storefront.product(&product_id).await?;
            state.cart.add_to_cart(product, quantity).await?
        }
        CartCommand::Remove { product_id } => state.cart.remove_from_cart(&product_id).await?,
        CartCommand::Set {
            product_id,
            quantity,
        } => state.cart.update_quantity(&product_id, quantity).await?,
        CartCommand::Clear => state.cart.clear_cart().await?,
    };

    out.either(&cart, |theme| format::format_cart(&cart, theme))
}

async fn run_wishlist(state: &AppState, out: &Output, cmd: WishlistCommand) -> anyhow::Result<()> {
    match cmd {
        WishlistCommand::List => {
            let items = state.storefront.wishlist().await?;
            out.either(&items, |theme| {
                let products: Vec<_> = items.iter().filter_map(|i| i.product.clone()).collect();
                format::format_products("Wishlist", &products, theme)
            })?;
        }
        WishlistCommand::Add { product_id } => {
            let response = state.storefront.add_to_wishlist(&product_id).await?;
            println!("{}", response.message);
        }
        WishlistCommand::Remove { product_id } => {
            let response = state.storefront.remove_from_wishlist(&product_id).await?;
            println!("{}", response.message);
        }
    }
    Ok(())
}

fn supplier_action(approve: bool, reject: bool) -> anyhow::Result<SupplierAction> {
    match (approve, reject) {
        (true, false) => Ok(SupplierAction::Approve),
        (false, true) => Ok(SupplierAction::Reject),
        _ => anyhow::bail!("Pass exactly one of --approve or --reject"),
    }
}

async fn run_admin(state: &AppState, out: &Output, cmd: AdminCommand) -> anyhow::Result<()> {
    let admin = &state.admin;
    match cmd {
        AdminCommand::Pending { page, limit } => {
            out.value(&admin.pending_products(&PageParams { page, limit }).await?)?;
        }
        AdminCommand::Products {
            page,
            limit,
            status,
        } => {
            let filter = ProductFilter {
                page,
                limit,
                status_filter: status,
            };
            out.value(&admin.all_products(&filter).await?)?;
        }
        AdminCommand::Product { id } => out.value(&admin.product(&id).await?)?,
        AdminCommand::Review {
            id,
            approve,
            reject,
            notes,
        } => {
            let approved = supplier_action(approve, reject)? == SupplierAction::Approve;
            out.value(&admin.review_product(&id, approved, &notes).await?)?;
        }
        AdminCommand::Delete { id } => {
            admin.delete_product(&id).await?;
            println!("Deleted product {}", id);
        }
        AdminCommand::Status { id, status } => {
            out.value(&admin.update_product_status(&id, &status).await?)?;
        }
        AdminCommand::Orders {
            page,
            limit,
            status,
            user,
            supplier,
        } => {
            let filter = OrderFilter {
                page,
                limit,
                status,
                user_id: user,
                supplier_id: supplier,
            };
            out.value(&admin.all_orders(&filter).await?)?;
        }
        AdminCommand::OrderStatus { id, status } => {
            out.value(&admin.update_order_status(&id, &status).await?)?;
        }
        AdminCommand::Analytics {
            start,
            end,
            granularity,
        } => {
            let params = AnalyticsParams {
                start_date: start,
                end_date: end,
                granularity,
            };
            out.value(&admin.order_analytics(&params).await?)?;
        }
        AdminCommand::Suppliers {
            page,
            limit,
            verification,
        } => {
            let filter = SupplierFilter {
                page,
                limit,
                verification_status: verification,
            };
            out.value(&admin.all_suppliers(&filter).await?)?;
        }
        AdminCommand::Documents { supplier_id } => {
            out.value(&admin.supplier_documents(&supplier_id).await?)?;
        }
        AdminCommand::ReviewSupplier {
            supplier_id,
            approve,
            reject,
            comment,
        } => {
            let action = supplier_action(approve, reject)?;
            out.value(&admin.review_supplier(&supplier_id, action, &comment).await?)?;
        }
        AdminCommand::Verify {
            supplier_id,
            rejected,
            comment,
        } => {
            out.value(
                &admin
                    .update_supplier_status(&supplier_id, !rejected, &comment)
                    .await?,
            )?;
        }
        AdminCommand::Dashboard => {
            let stats = admin.dashboard_stats().await?;
            out.either(&stats, |theme| format::format_dashboard(&stats, theme))?;
        }
        AdminCommand::Sales { period, kind } => {
            let chart = admin.sales_chart(&ChartParams { period, kind }).await;
            out.either(&chart, |theme| format::format_sales_chart(&chart, theme))?;
        }
        AdminCommand::Top { limit, period } => {
            let top = admin
                .top_products(&TopProductsParams { limit, period })
                .await;
            out.either(&top, |theme| format::format_top_products(&top, theme))?;
        }
    }
    Ok(())
}

/// Initialize logging with path and level configuration
fn init_logging(logging: &Logging) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let level = match logging.level.as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARN" => "warn",
        "ERROR" => "error",
        _ => "warn",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(path) = &logging.path {
        if !path.is_empty() {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file)
                .init();
            return Ok(());
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

async fn print_status(state: &AppState, store: &SqliteStore) -> anyhow::Result<()> {
    println!("{}", "aveo Status".green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!("Backend: {}", state.api.base_url());
    match state.storefront.health().await {
        Ok(health) => println!(
            "Health: {} ({})",
            health.status,
            health.version.as_deref().unwrap_or("unknown version")
        ),
        Err(e) => println!("Health: {}", format!("unreachable ({})", e).red()),
    }

    let db_path = config::get_database_path(&state.config);
    println!(
        "Storage: {} ({} keys)",
        db_path.display(),
        store.count().await?
    );

    let cart = state.cart.get_cart().await?;
    println!("Cart: {} items", cart.total_items());

    println!(
        "Session: {}",
        if state.api.token().is_some() {
            "Logged in"
        } else {
            "Not logged in"
        }
    );

    println!(
        "Config: {}",
        config::get_config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "Not found".to_string())
    );

    Ok(())
}

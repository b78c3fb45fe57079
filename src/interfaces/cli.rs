use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "aveo")]
#[command(about = "Command-line client for the AveoEarth marketplace.")]
#[command(version)]
pub struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Bypass the response cache for this run
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Choose color theme
    #[arg(short = 'T', long, global = true)]
    pub theme: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in and remember the access token
    Login {
        email: String,
        /// Read from AVEO_PASSWORD when omitted
        #[arg(long, env = "AVEO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored access token
    Logout,
    /// Show the logged-in profile
    Whoami,
    /// List catalog products
    Products {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one product
    Product { id: String },
    /// Full-text product search
    Search {
        #[arg(num_args = 1..)]
        query: Vec<String>,
    },
    /// Trending products
    Trending {
        #[arg(long, default_value_t = 12)]
        limit: u32,
    },
    /// Category tree
    Categories,
    /// Local cart
    #[command(subcommand)]
    Cart(CartCommand),
    /// Wishlist
    #[command(subcommand)]
    Wishlist(WishlistCommand),
    /// Your orders
    Orders {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Saved shipping and billing addresses
    Addresses,
    /// Admin panel operations
    #[command(subcommand)]
    Admin(AdminCommand),
    /// Backend health, session and storage status
    Status,
    /// Generate config sample
    GenerateConfig,
}

#[derive(Subcommand)]
pub enum CartCommand {
    Show,
    /// Fetch a product and add it
    Add {
        product_id: String,
        #[arg(default_value_t = 1)]
        quantity: u32,
    },
    Remove { product_id: String },
    /// Set a quantity; 0 removes the line
    Set { product_id: String, quantity: u32 },
    Clear,
}

#[derive(Subcommand)]
pub enum WishlistCommand {
    List,
    Add { product_id: String },
    Remove { product_id: String },
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Products awaiting review
    Pending {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    Products {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        status: Option<String>,
    },
    Product { id: String },
    /// Approve or reject a product
    Review {
        id: String,
        #[arg(long, conflicts_with = "reject")]
        approve: bool,
        #[arg(long)]
        reject: bool,
        #[arg(long, default_value = "")]
        notes: String,
    },
    Delete { id: String },
    Status { id: String, status: String },
    Orders {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        supplier: Option<String>,
    },
    OrderStatus { id: String, status: String },
    Analytics {
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        granularity: Option<String>,
    },
    Suppliers {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        verification: Option<String>,
    },
    Documents { supplier_id: String },
    ReviewSupplier {
        supplier_id: String,
        #[arg(long, conflicts_with = "reject")]
        approve: bool,
        #[arg(long)]
        reject: bool,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Mark a supplier verified (or rejected with --rejected)
    Verify {
        supplier_id: String,
        #[arg(long)]
        rejected: bool,
        #[arg(long, default_value = "")]
        comment: String,
    },
    Dashboard,
    Sales {
        #[arg(long)]
        period: Option<String>,
        #[arg(long = "type")]
        kind: Option<String>,
    },
    Top {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        period: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_parse_before_and_after_subcommand() {
        let cli = Cli::try_parse_from(["aveo", "--no-cache", "status"]).unwrap();
        assert!(cli.no_cache);
        assert!(matches!(cli.command, Command::Status));

        let cli = Cli::try_parse_from(["aveo", "admin", "dashboard", "--no-cache", "--json"]).unwrap();
        assert!(cli.no_cache && cli.json);

        let cli = Cli::try_parse_from(["aveo", "status"]).unwrap();
        assert!(!cli.no_cache);
    }
}

use crate::domain::model::{Cart, DashboardStats, Product, SalesChart, TopProduct};
use crate::presentation::theme::Theme;
use std::fmt::Write;

fn rule(theme: &Theme) -> String {
    (theme.line)(&"─".repeat(40))
}

fn money(v: f64) -> String {
    format!("{:.2}", v)
}

fn product_line(product: &Product, theme: &Theme) -> String {
    let mut line = format!(
        "{}  {}",
        (theme.label)(&product.name),
        (theme.price)(&money(product.effective_price()))
    );
    if let Some(discount) = product.discount.filter(|d| *d > 0.0) {
        line.push_str(&format!(" {}", (theme.discount)(&format!("-{}%", discount))));
    }
    if let Some(score) = product.sustainability_score {
        line.push_str(&format!(" {}", (theme.eco)(&format!("eco {}", score))));
    }
    line
}

pub fn format_cart(cart: &Cart, theme: &Theme) -> String {
    let mut output = String::new();
    writeln!(output, "{}", (theme.title)("Cart")).ok();

    if cart.is_empty() {
        writeln!(output, "  {}", (theme.muted)("(empty)")).ok();
        return output;
    }

    for (i, item) in cart.items.iter().enumerate() {
        writeln!(
            output,
            "  {}. {} × {}  {}",
            (theme.idx)(&(i + 1).to_string()),
            item.quantity,
            product_line(&item.product, theme),
            (theme.muted)(&item.product.id)
        )
        .ok();
    }

    writeln!(output, "  {}", rule(theme)).ok();
    writeln!(
        output,
        "  {} items, total {}",
        cart.total_items(),
        (theme.price)(&money(cart.total_price()))
    )
    .ok();
    output
}

pub fn format_products(title: &str, products: &[Product], theme: &Theme) -> String {
    let mut output = String::new();
    writeln!(output, "{}", (theme.title)(title)).ok();
    if products.is_empty() {
        writeln!(output, "  {}", (theme.muted)("no products")).ok();
    }
    for (i, product) in products.iter().enumerate() {
        writeln!(
            output,
            "  {}. {}  {}",
            (theme.idx)(&(i + 1).to_string()),
            product_line(product, theme),
            (theme.muted)(&product.id)
        )
        .ok();
    }
    output
}

pub fn format_dashboard(stats: &DashboardStats, theme: &Theme) -> String {
    let mut output = String::new();
    writeln!(output, "{}", (theme.title)("Dashboard")).ok();
    let rows = [
        ("Products", stats.total_products.to_string()),
        ("Pending review", stats.pending_products.to_string()),
        ("Orders", stats.total_orders.to_string()),
        ("Revenue", money(stats.total_revenue)),
        ("Suppliers", stats.total_suppliers.to_string()),
        ("Verified suppliers", stats.verified_suppliers.to_string()),
    ];
    for (label, value) in rows {
        writeln!(output, "  {:<20}{}", (theme.label)(label), value).ok();
    }
    output
}

const BAR_WIDTH: f64 = 30.0;

pub fn format_sales_chart(chart: &SalesChart, theme: &Theme) -> String {
    let mut output = String::new();
    writeln!(output, "{}", (theme.title)("Sales")).ok();
    let span = (chart.max_value).max(1.0);
    for point in &chart.data {
        let width = ((point.value / span) * BAR_WIDTH).round().clamp(0.0, BAR_WIDTH) as usize;
        writeln!(
            output,
            "  {:>3} {} {}",
            point.day,
            (theme.eco)(&"█".repeat(width)),
            (theme.muted)(&point.value.to_string())
        )
        .ok();
    }
    output
}

pub fn format_top_products(products: &[TopProduct], theme: &Theme) -> String {
    let mut output = String::new();
    writeln!(output, "{}", (theme.title)("Top products")).ok();
    for (i, product) in products.iter().enumerate() {
        writeln!(
            output,
            "  {}. {}  {} orders, {} likes",
            (theme.idx)(&(i + 1).to_string()),
            (theme.label)(&product.name),
            product.orders,
            product.likes
        )
        .ok();
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CartItem, SalesPoint};

    #[test]
    fn cart_summary_lists_lines_and_total() {
        let theme = Theme::from_name("plain");
        let cart = Cart {
            items: vec![CartItem {
                product: Product {
                    id: "p1".into(),
                    name: "Bamboo Spoons".into(),
                    price: 100.0,
                    discount: Some(10.0),
                    ..Default::default()
                },
                quantity: 2,
            }],
        };

        let out = format_cart(&cart, &theme);
        assert!(out.contains("1. 2 × Bamboo Spoons  90.00 -10%  p1"));
        assert!(out.contains("2 items, total 180.00"));
    }

    #[test]
    fn empty_cart_says_so() {
        let out = format_cart(&Cart::default(), &Theme::from_name("plain"));
        assert!(out.contains("(empty)"));
    }

    #[test]
    fn dashboard_rows() {
        let stats = DashboardStats {
            total_products: 12,
            verified_suppliers: 3,
            ..Default::default()
        };
        let out = format_dashboard(&stats, &Theme::from_name("plain"));
        assert!(out.contains("Products            12"));
        assert!(out.contains("Verified suppliers  3"));
    }

    #[test]
    fn sales_bars_stay_within_width() {
        let chart = SalesChart {
            data: vec![
                SalesPoint { day: "10".into(), value: 45.0 },
                SalesPoint { day: "11".into(), value: 900.0 },
                SalesPoint { day: "12".into(), value: -5.0 },
            ],
            max_value: 90.0,
            min_value: 20.0,
        };
        let out = format_sales_chart(&chart, &Theme::from_name("plain"));
        let bars: Vec<usize> = out
            .lines()
            .skip(1)
            .map(|line| line.matches('█').count())
            .collect();
        assert_eq!(bars, vec![15, 30, 0]);
    }
}

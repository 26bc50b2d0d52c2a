use alloy::{primitives::Address, providers::Provider};
use colored::Colorize;
use launchpad_sdk::{catalog::TokenCatalog, error::LaunchpadError};

pub(crate) async fn render<P: Provider + Clone>(
    catalog: &TokenCatalog<P>,
    token: Address,
) -> anyhow::Result<()> {
    println!("{}\n", format!("{:#^100}", format!(" {token} ")).bold().purple());

    let curve = catalog.pricer().curve_state(token).await?;
    match catalog.pricer().price_from_state(token, curve.as_ref()).await {
        Ok(price) => {
            println!(
                "Price: {} {}",
                price.to_plain_string().green().bold(),
                format!("({:?})", price.source()).dimmed(),
            );
        },
        Err(LaunchpadError::NoCurveData(_)) => {
            println!("Price: {}", "no curve data available".yellow());
        },
        Err(err) => return Err(err.into()),
    }

    let graduation = catalog.tracker().status(token, curve.as_ref()).await;
    println!(
        "Graduation: {}%{}{}",
        graduation.progress_percent(),
        if graduation.is_graduated() { format!(" {}", "GRADUATED".purple().bold()) } else { String::new() },
        if graduation.can_graduate() { format!(" {}", "ready to graduate".cyan()) } else { String::new() },
    );

    if let Some(curve) = curve {
        println!(
            "Raised: {} | Sold: {} | Active: {}",
            curve.reserves_in(),
            curve.sold_supply(),
            if curve.active() { "yes".green() } else { "no".red() },
        );
    }

    Ok(())
}

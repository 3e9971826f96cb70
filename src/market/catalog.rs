//! Static demo catalog
//!
//! Every function returns the same entries in the same order on every call.

use uuid::Uuid;

use super::types::{
    ActiveSnipe, GraduatedToken, Priority, SnipeStatus, SnipeType, TokenListing, TokenPosition,
    UserBalances,
};

/// Newly launched tokens
pub fn token_listings() -> Vec<TokenListing> {
    let rows: [(&str, &str, &str, &str, u32, &str, &str, &str, &str, &str); 6] = [
        ("Believe AI", "BLVAI", "$1.2M", "14m", 842, "12.4K", "$184K", "Believe", "@believeai_dev", "14m ago"),
        ("Launch Pad", "LPAD", "$486K", "32m", 311, "3.1K", "$72K", "Believe", "@launchpadsol", "32m ago"),
        ("Moon Mission", "MOON", "$2.8M", "1h", 1_927, "48.9K", "$410K", "Meteora", "@moonmission", "1h ago"),
        ("Degen Capital", "DCAP", "$97K", "6m", 64, "812", "$21K", "Believe", "@degencap", "6m ago"),
        ("Solana Sniper", "SNIPE", "$640K", "2h", 755, "9.7K", "$133K", "Raydium", "@sol_sniper", "2h ago"),
        ("Ticker Town", "TOWN", "$58K", "3m", 41, "1.2K", "$14K", "Believe", "@tickertown", "3m ago"),
    ];

    rows.into_iter()
        .map(
            |(name, ticker, market_cap, contract_age, holders, x_followers, liquidity, pool, deployed_by, pair_created)| {
                TokenListing {
                    name: name.into(),
                    ticker: ticker.into(),
                    market_cap: market_cap.into(),
                    contract_age: contract_age.into(),
                    holders,
                    x_followers: x_followers.into(),
                    liquidity: liquidity.into(),
                    pool: pool.into(),
                    deployed_by: deployed_by.into(),
                    pair_created: pair_created.into(),
                }
            },
        )
        .collect()
}

/// Tokens that completed their bonding curve
pub fn graduated_tokens() -> Vec<GraduatedToken> {
    let rows: [(&str, &str, &str, &str, &str, &str, u32, &str, &str); 5] = [
        ("BelieverCoin", "BLVR", "$8.4M", "$0.0084", "+42.7%", "$1.9M", 12_408, "Raydium", "@believercoin"),
        ("Solana Summer", "SSMR", "$3.1M", "$0.0031", "+18.2%", "$740K", 6_215, "Meteora", "@solsummer"),
        ("Pump Republic", "PREP", "$1.7M", "$0.0017", "-6.4%", "$312K", 3_987, "Raydium", "@pumprepublic"),
        ("Gigabrain", "GBRN", "$12.9M", "$0.0129", "+5.1%", "$2.6M", 18_730, "Raydium", "@gigabrain_sol"),
        ("Wen Lambo", "LAMBO", "$920K", "$0.00092", "-21.3%", "$96K", 1_544, "Meteora", "@wenlambo"),
    ];

    rows.into_iter()
        .map(
            |(name, ticker, market_cap, price, change, volume, tx_count, pool, deployed_by)| {
                GraduatedToken {
                    name: name.into(),
                    ticker: ticker.into(),
                    market_cap: market_cap.into(),
                    price: price.into(),
                    change: change.into(),
                    volume: volume.into(),
                    tx_count,
                    pool: pool.into(),
                    deployed_by: deployed_by.into(),
                }
            },
        )
        .collect()
}

/// Snipe jobs served by `GET /api/sniper`
///
/// Independent of the jobs a dashboard session creates. Ids are fixed so the
/// list is identical on every call.
pub fn fixture_snipes() -> Vec<ActiveSnipe> {
    vec![
        ActiveSnipe {
            id: Uuid::from_u128(1),
            target: "@believeapp".into(),
            snipe_type: SnipeType::XAccount,
            amount: "0.5 SOL".into(),
            slippage: "15%".into(),
            status: SnipeStatus::Monitoring,
            created: "2h ago".into(),
            priority: Priority::High,
            pool: "Believe".into(),
        },
        ActiveSnipe {
            id: Uuid::from_u128(2),
            target: "BLVAI".into(),
            snipe_type: SnipeType::DirectSnipe,
            amount: "1 SOL".into(),
            slippage: "10%".into(),
            status: SnipeStatus::Pending,
            created: "35m ago".into(),
            priority: Priority::Medium,
            pool: "Believe".into(),
        },
        ActiveSnipe {
            id: Uuid::from_u128(3),
            target: "MOON".into(),
            snipe_type: SnipeType::DirectSnipe,
            amount: "0.25 SOL".into(),
            slippage: "20%".into(),
            status: SnipeStatus::Completed,
            created: "1d ago".into(),
            priority: Priority::Low,
            pool: "Meteora".into(),
        },
    ]
}

/// Balances and positions seeded once the access gate passes
pub fn demo_balances() -> UserBalances {
    let rows: [(&str, &str, &str, &str, &str, &str, f64, f64); 3] = [
        ("BelieverCoin", "BLVR", "250,000", "2.10 SOL", "0.0000034", "0.0000084", 147.1, 1.25),
        ("Solana Summer", "SSMR", "120,000", "0.37 SOL", "0.0000026", "0.0000031", 19.2, 0.06),
        ("Pump Republic", "PREP", "400,000", "0.68 SOL", "0.0000021", "0.0000017", -19.0, -0.16),
    ];

    let positions = rows
        .into_iter()
        .map(
            |(token, ticker, amount, value, buy_price, current_price, profit, profit_value)| {
                TokenPosition {
                    id: Uuid::new_v4(),
                    token: token.into(),
                    ticker: ticker.into(),
                    amount: amount.into(),
                    value: value.into(),
                    buy_price: buy_price.into(),
                    current_price: current_price.into(),
                    profit,
                    profit_value,
                }
            },
        )
        .collect();

    UserBalances {
        sol: "12.45".into(),
        sob: "250000".into(),
        positions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_stable() {
        assert_eq!(token_listings(), token_listings());
        assert_eq!(graduated_tokens(), graduated_tokens());
        assert_eq!(fixture_snipes(), fixture_snipes());
    }

    #[test]
    fn test_catalogs_are_disjoint() {
        let listed: Vec<String> = token_listings().into_iter().map(|t| t.name).collect();
        assert!(graduated_tokens()
            .iter()
            .all(|g| !listed.contains(&g.name)));
    }

    #[test]
    fn test_demo_positions_include_believer_coin() {
        let balances = demo_balances();
        assert_eq!(balances.positions.len(), 3);
        assert_eq!(balances.positions[0].token, "BelieverCoin");
    }
}

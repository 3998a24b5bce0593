//! Built-in practice scenarios written to the store by `campaign-drill init`.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

use super::types::{AllocationScenario, Level, ProjectionScenario, ScenarioFile};

// 2024-01-01T00:00:00Z; seed records are spaced a minute apart in list order
const SEED_EPOCH_SECS: i64 = 1_704_067_200;

fn seeded_at(position: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(SEED_EPOCH_SECS + position * 60)
}

fn numbers(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), *value))
        .collect()
}

fn texts(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(name, text)| (name.to_string(), text.to_string()))
        .collect()
}

/// One built-in allocation scenario; the split lists channels in display order.
struct AllocationSeed {
    id: &'static str,
    level: Level,
    title: &'static str,
    description: &'static str,
    total_budget: f64,
    goal: &'static str,
    split: &'static [(&'static str, f64)],
}

const ALLOCATION_SEEDS: &[AllocationSeed] = &[
    AllocationSeed {
        id: "alloc-b2b-saas-leads",
        level: Level::Basic,
        title: "B2B SaaS Lead Generation",
        description: "A project management startup wants more demo requests from mid-size companies.",
        total_budget: 50_000.0,
        goal: "Maximize qualified demo requests within one quarter",
        split: &[
            ("Google Ads", 50.0),
            ("LinkedIn Ads", 30.0),
            ("Email Marketing", 20.0),
        ],
    },
    AllocationSeed {
        id: "alloc-coffee-shop-awareness",
        level: Level::Basic,
        title: "Neighborhood Coffee Shop",
        description: "A new coffee shop needs foot traffic from people living and working nearby.",
        total_budget: 5_000.0,
        goal: "Build local awareness in the first two months",
        split: &[
            ("Instagram Ads", 40.0),
            ("Local Events", 25.0),
            ("Google Ads", 20.0),
            ("Flyers", 15.0),
        ],
    },
    AllocationSeed {
        id: "alloc-ecommerce-holiday",
        level: Level::Intermediate,
        title: "E-commerce Holiday Push",
        description: "An online home goods store is planning its biggest sales season of the year.",
        total_budget: 120_000.0,
        goal: "Maximize revenue at a ROAS of at least 4x",
        split: &[
            ("Google Shopping", 35.0),
            ("Meta Ads", 30.0),
            ("Email Marketing", 15.0),
            ("Influencers", 10.0),
            ("Affiliates", 10.0),
        ],
    },
    AllocationSeed {
        id: "alloc-mobile-app-launch",
        level: Level::Advanced,
        title: "Mobile Fitness App Launch",
        description: "A subscription fitness app is launching in two markets with a fixed install target.",
        total_budget: 250_000.0,
        goal: "Reach 50,000 installs with a 30-day retention above 25%",
        split: &[
            ("Apple Search Ads", 30.0),
            ("TikTok Ads", 25.0),
            ("Google App Campaigns", 20.0),
            ("Influencers", 15.0),
            ("PR", 10.0),
        ],
    },
];

impl AllocationSeed {
    fn to_scenario(&self, position: i64) -> AllocationScenario {
        AllocationScenario {
            id: self.id.to_string(),
            level: self.level,
            title: self.title.to_string(),
            description: self.description.to_string(),
            total_budget: self.total_budget,
            goal: self.goal.to_string(),
            channels: self.split.iter().map(|(name, _)| name.to_string()).collect(),
            answer_key: numbers(self.split),
            created_at: seeded_at(position),
        }
    }
}

pub fn seed_allocation_scenarios() -> Vec<AllocationScenario> {
    ALLOCATION_SEEDS
        .iter()
        .zip(0..)
        .map(|(seed, position)| seed.to_scenario(position))
        .collect()
}

pub fn seed_projection_scenarios() -> Vec<ProjectionScenario> {
    vec![
        ProjectionScenario {
            id: "proj-webinar-funnel".to_string(),
            title: "Webinar Funnel".to_string(),
            description: "A paid social campaign drove sign-ups to a product webinar. \
                Work out the core unit economics."
                .to_string(),
            metrics: numbers(&[
                ("Ad Spend", 5_000.0),
                ("New Customers", 100.0),
                ("Revenue", 9_000.0),
                ("Average Purchase Value", 45.0),
                ("Purchases per Customer", 2.0),
            ]),
            answer_key: numbers(&[("CAC", 50.0), ("LTV", 90.0), ("ROI", 0.8), ("ROAS", 1.8)]),
            hints: texts(&[
                ("CAC", "Divide ad spend by the number of new customers."),
                ("LTV", "Multiply average purchase value by purchases per customer."),
                ("ROI", "Subtract ad spend from revenue, then divide by ad spend."),
                ("ROAS", "Divide revenue by ad spend."),
            ]),
            created_at: seeded_at(10),
        },
        ProjectionScenario {
            id: "proj-subscription-box".to_string(),
            title: "Subscription Box".to_string(),
            description: "A monthly snack box ran a referral campaign. \
                Estimate whether the customers it brought in are worth it."
                .to_string(),
            metrics: numbers(&[
                ("Campaign Spend", 24_000.0),
                ("New Subscribers", 400.0),
                ("Monthly Price", 30.0),
                ("Average Lifetime (months)", 12.0),
            ]),
            answer_key: numbers(&[
                ("CAC", 60.0),
                ("LTV", 360.0),
                ("LTV:CAC", 6.0),
                ("Payback (months)", 2.0),
            ]),
            hints: texts(&[
                ("CAC", "Divide campaign spend by new subscribers."),
                ("LTV", "Monthly price times average lifetime in months."),
                ("LTV:CAC", "Divide LTV by CAC."),
                ("Payback (months)", "How many monthly payments cover the CAC?"),
            ]),
            created_at: seeded_at(11),
        },
        ProjectionScenario {
            id: "proj-breakeven-search".to_string(),
            title: "Break-even Search Campaign".to_string(),
            description: "A search campaign for a furniture retailer paid for itself and nothing more."
                .to_string(),
            metrics: numbers(&[
                ("Ad Spend", 10_000.0),
                ("Clicks", 5_000.0),
                ("Customers", 250.0),
                ("Revenue", 10_000.0),
            ]),
            answer_key: numbers(&[
                ("CAC", 40.0),
                ("Conversion Rate (%)", 5.0),
                ("ROI", 0.0),
                ("ROAS", 1.0),
            ]),
            hints: texts(&[
                ("Conversion Rate (%)", "Customers divided by clicks, as a percentage."),
                ("ROI", "Net gain divided by cost. What is the net gain here?"),
            ]),
            created_at: seeded_at(12),
        },
    ]
}

/// The full seed store document.
pub fn seed_scenarios() -> ScenarioFile {
    ScenarioFile {
        allocation: seed_allocation_scenarios(),
        projection: seed_projection_scenarios(),
        ..ScenarioFile::new()
    }
}

use serde::{Deserialize, Serialize};

/// Credit balance of one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub user_id: String,
    pub credits: i64,
}

/// Credit pack offered on the pricing page. Prices are in rupees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingPlan {
    pub id: &'static str,
    pub name: &'static str,
    pub credits: i64,
    pub price: u32,
    pub highlighted: bool,
}

pub static PRICING_PLANS: [PricingPlan; 4] = [
    PricingPlan {
        id: "starter",
        name: "Starter",
        credits: 5,
        price: 100,
        highlighted: false,
    },
    PricingPlan {
        id: "growth",
        name: "Growth",
        credits: 25,
        price: 450,
        highlighted: true,
    },
    PricingPlan {
        id: "professional",
        name: "Professional",
        credits: 50,
        price: 800,
        highlighted: false,
    },
    PricingPlan {
        id: "enterprise",
        name: "Enterprise",
        credits: 100,
        price: 1400,
        highlighted: false,
    },
];

pub fn find_plan(id: &str) -> Option<&'static PricingPlan> {
    PRICING_PLANS.iter().find(|p| p.id.eq_ignore_ascii_case(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_lookup_ignores_case() {
        assert_eq!(find_plan("Growth").map(|p| p.credits), Some(25));
        assert!(find_plan("platinum").is_none());
    }

    #[test]
    fn bigger_packs_are_cheaper_per_credit() {
        let per_credit: Vec<u32> = PRICING_PLANS
            .iter()
            .map(|p| p.price / p.credits as u32)
            .collect();
        assert!(per_credit.windows(2).all(|w| w[0] >= w[1]));
    }
}

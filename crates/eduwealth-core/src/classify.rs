//! Spending classifier
//!
//! Decides whether an expense is essential or wasteful, and whether course
//! recommendations should be shown as an alternative. Pure function over the
//! declared category plus the item name and optional description; no I/O.
//!
//! The rule chain is evaluated in order and returns on first hit:
//! keyword lists first (essential before wasteful, so an item matching both
//! is treated as essential), then category rules, then a default that leans
//! essential to avoid upsell noise for unanticipated categories.

use serde::Serialize;

/// Essential/beneficial items - no course suggestions
const ESSENTIAL_KEYWORDS: &[&str] = &[
    // Basic necessities & groceries
    "groceries",
    "vegetables",
    "fruits",
    "rice",
    "wheat",
    "flour",
    "dal",
    "milk",
    "eggs",
    "bread",
    "butter",
    "oil",
    "sugar",
    "salt",
    "spices",
    "lentils",
    "beans",
    // Healthy fruits & vegetables
    "apple",
    "banana",
    "orange",
    "mango",
    "grapes",
    "watermelon",
    "papaya",
    "pomegranate",
    "tomato",
    "potato",
    "onion",
    "carrot",
    "spinach",
    "broccoli",
    "cabbage",
    // Healthy proteins
    "chicken",
    "fish",
    "meat",
    "paneer",
    "tofu",
    "nuts",
    "almonds",
    "cashews",
    // Healthcare
    "medicine",
    "doctor",
    "hospital",
    "medical",
    "health insurance",
    "treatment",
    "pharmacy",
    // Bills & utilities
    "rent",
    "electricity",
    "water bill",
    "gas",
    "internet bill",
    "phone bill",
    "maintenance",
    // Education
    "school fee",
    "college fee",
    "tuition",
    "books",
    "stationery",
    "uniform",
    "study material",
    // Transport (essential)
    "transport",
    "bus pass",
    "metro",
    "fuel for work",
    "commute",
    "petrol for office",
    // Healthy food & drinks
    "salad",
    "juice",
    "smoothie",
    "whole grain",
    "protein",
    "vitamins",
    "green tea",
    // Fitness & wellness
    "gym membership",
    "yoga",
    "fitness",
    "exercise equipment",
    "sports equipment",
    // Productive items
    "course",
    "learning",
    "skill development",
    "certification",
    "training",
    "laptop for work",
    "work equipment",
    "professional tools",
];

/// Wasteful/harmful items - show course suggestions
const WASTEFUL_KEYWORDS: &[&str] = &[
    // Junk food (clearly unhealthy)
    "burger",
    "pizza",
    "fries",
    "french fries",
    "chips",
    "wafers",
    "candy",
    "cake",
    "pastry",
    "donuts",
    "cookies",
    "biscuits",
    "soda",
    "cold drink",
    "cola",
    "junk food",
    "fast food",
    "street food",
    "pani puri",
    "samosa fried",
    "pakora",
    "momos",
    "chaat",
    "vada pav",
    "pav bhaji fried",
    // Processed & unhealthy
    "instant noodles",
    "maggi",
    "kurkure",
    "lays",
    "doritos",
    "cheetos",
    // Harmful substances
    "cigarette",
    "tobacco",
    "alcohol",
    "beer",
    "wine",
    "whiskey",
    "vodka",
    "rum",
    "smoking",
    // Entertainment/Luxury (non-essential)
    "movie ticket",
    "cinema",
    "gaming",
    "video game",
    "console",
    "playstation",
    "xbox",
    "party",
    "club",
    "nightclub",
    "pub",
    "bar",
    "luxury item",
    "branded bag",
    "shopping spree",
    "impulse buy",
    "unnecessary shopping",
    // Unnecessary subscriptions
    "ott subscription",
    "netflix",
    "prime video",
    "hotstar",
    "multiple subscriptions",
];

/// Classification verdict for a single expense
///
/// Transient: produced at expense-creation time and never persisted, so
/// re-fetching an expense does not re-expose it.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub is_essential: bool,
    pub show_courses: bool,
    pub category_label: String,
    pub message: String,
}

impl Verdict {
    fn essential(label: &str, message: &str) -> Self {
        Self {
            is_essential: true,
            show_courses: false,
            category_label: label.to_string(),
            message: message.to_string(),
        }
    }

    fn wasteful(label: &str, message: &str) -> Self {
        Self {
            is_essential: false,
            show_courses: true,
            category_label: label.to_string(),
            message: message.to_string(),
        }
    }
}

/// Classify an expense as essential or wasteful
///
/// Total and deterministic: every input produces a verdict, unrecognized
/// categories fall through to the default rule rather than erroring.
pub fn classify(category: &str, item_name: &str, description: Option<&str>) -> Verdict {
    let combined_text = format!(
        "{} {}",
        item_name.to_lowercase(),
        description.unwrap_or("").to_lowercase()
    );

    if ESSENTIAL_KEYWORDS.iter().any(|kw| combined_text.contains(kw)) {
        return Verdict::essential(
            "Essential",
            "✅ Great! This is an essential/beneficial expense. Keep investing in what matters!",
        );
    }

    if WASTEFUL_KEYWORDS.iter().any(|kw| combined_text.contains(kw)) {
        return Verdict::wasteful(
            "Non-Essential",
            "💡 This could be an opportunity to invest in yourself! Instead of temporary satisfaction, consider learning something valuable.",
        );
    }

    if category == "Food & Drinks" {
        return Verdict::wasteful(
            "Non-Essential Food",
            "💡 Consider if this is truly necessary. You could invest in a skill that benefits you long-term!",
        );
    }

    if category == "Entertainment" || category == "Shopping" {
        return Verdict::wasteful(
            "Non-Essential",
            "🎯 Entertainment is good, but growth is better! Consider investing this amount in your future.",
        );
    }

    let seems_essential = category == "Transport"
        || combined_text.contains("work")
        || combined_text.contains("office")
        || combined_text.contains("essential");

    if seems_essential {
        return Verdict::essential(
            "Essential",
            "✅ This seems like a necessary expense. Good financial management!",
        );
    }

    // Unclear cases lean essential unless proven otherwise
    Verdict::essential("General", "✅ Expense tracked successfully!")
}

// Film title templates
// 16 categories, each with its own templates, word pools, rating mix, and
// length/cost ranges. Placeholders {adjective} {noun} {name} {location}
// {verb} are filled by a data-driven substitution table.

use crate::constants::{RATINGS, RENTAL_PRICE_RATIO};
use crate::sim::rng::SimRng;

#[derive(Debug)]
pub struct CategoryProfile {
    pub name: &'static str,
    pub templates: &'static [&'static str],
    pub adjectives: &'static [&'static str],
    pub nouns: &'static [&'static str],
    /// Weights for G, PG, PG-13, R, NC-17.
    pub rating_weights: [f64; 5],
    /// Minutes, inclusive.
    pub length_range: [i64; 2],
    /// Replacement cost in dollars, inclusive.
    pub cost_range: [f64; 2],
}

// Shared pools
const NAMES: &[&str] = &[
    "Amelia", "Baxter", "Carmen", "Dalton", "Elena", "Flint", "Greta", "Harlan", "Imogen",
    "Jasper", "Kendra", "Lorenzo", "Mabel", "Nikolai", "Octavia", "Preston", "Quinn", "Rosalind",
    "Sterling", "Tatiana", "Ulysses", "Veronica", "Wendell", "Ximena", "Yates", "Zelda",
];

const LOCATIONS: &[&str] = &[
    "Amsterdam", "Bangkok", "Cairo", "Denver", "El Paso", "Florence", "Glasgow", "Havana",
    "Istanbul", "Juneau", "Kyoto", "Lisbon", "Monterey", "Naples", "Odessa", "Prague",
    "Quebec", "Reno", "Savannah", "Tulsa", "Utrecht", "Vienna", "Warsaw", "Yukon", "Zanzibar",
];

const VERBS: &[&str] = &[
    "Defy", "Outwit", "Rescue", "Betray", "Chase", "Discover", "Escape", "Forgive", "Haunt",
    "Inherit", "Pursue", "Redeem", "Survive", "Uncover", "Vanquish",
];

const DESCRIPTION_SUBJECTS: &[&str] = &[
    "a Database Administrator", "a Lumberjack", "a Composer", "a Waitress", "an Astronaut",
    "a Mechanic", "a Cartographer", "a Detective", "a Schoolteacher", "a Smuggler",
    "a Lighthouse Keeper", "a Pastry Chef", "a Prizefighter", "a Violinist", "a Rancher",
];

const DESCRIPTION_TWISTS: &[&str] = &[
    "who must confront their past", "who discovers an impossible secret",
    "caught between two worlds", "on the run from everything they know",
    "with one last chance at redemption", "who never learned to quit",
    "hiding in plain sight", "racing against the clock",
    "who trusts the wrong stranger", "bound by an old promise",
];

pub const CATEGORIES: [CategoryProfile; 16] = [
    CategoryProfile {
        name: "Action",
        templates: &[
            "{adjective} {noun}",
            "The {noun} of {location}",
            "{name}: {adjective} {noun}",
            "{verb} the {noun}",
            "{adjective} {noun} in {location}",
        ],
        adjectives: &["Burning", "Relentless", "Iron", "Savage", "Final", "Rogue", "Crimson"],
        nouns: &["Strike", "Vendetta", "Crossfire", "Pursuit", "Gauntlet", "Ambush", "Reckoning"],
        rating_weights: [0.02, 0.10, 0.38, 0.45, 0.05],
        length_range: [88, 135],
        cost_range: [14.99, 27.99],
    },
    CategoryProfile {
        name: "Animation",
        templates: &[
            "The {adjective} {noun}",
            "{name} and the {noun}",
            "{noun} of {location}",
            "A {adjective} {noun} Tale",
        ],
        adjectives: &["Tiny", "Brave", "Whimsical", "Lost", "Magical", "Clumsy", "Curious"],
        nouns: &["Dragonfly", "Kingdom", "Paintbrush", "Acorn", "Balloon", "Robot", "Lantern"],
        rating_weights: [0.45, 0.40, 0.13, 0.02, 0.0],
        length_range: [72, 105],
        cost_range: [12.99, 22.99],
    },
    CategoryProfile {
        name: "Children",
        templates: &[
            "{name}'s {adjective} {noun}",
            "The {noun} Club",
            "{adjective} {noun} Summer",
            "{name} and the {noun}",
        ],
        adjectives: &["Secret", "Giant", "Backyard", "Rainy-Day", "Homemade", "Grand"],
        nouns: &["Treehouse", "Puppy", "Circus", "Adventure", "Science Fair", "Treasure Map"],
        rating_weights: [0.55, 0.38, 0.07, 0.0, 0.0],
        length_range: [68, 98],
        cost_range: [11.99, 19.99],
    },
    CategoryProfile {
        name: "Classics",
        templates: &[
            "The {adjective} {noun}",
            "{noun} at {location}",
            "{name} of {location}",
            "A {noun} Remembered",
        ],
        adjectives: &["Gilded", "Forgotten", "Silent", "Grand", "Velvet", "Distant"],
        nouns: &["Boulevard", "Affair", "Letter", "Carousel", "Promenade", "Serenade"],
        rating_weights: [0.25, 0.35, 0.30, 0.10, 0.0],
        length_range: [95, 160],
        cost_range: [9.99, 18.99],
    },
    CategoryProfile {
        name: "Comedy",
        templates: &[
            "{adjective} {noun}",
            "{name} Goes to {location}",
            "My {adjective} {noun}",
            "The {noun} Situation",
        ],
        adjectives: &["Accidental", "Borrowed", "Terrible", "Half-Baked", "Suspicious", "Deluxe"],
        nouns: &["Wedding", "Roommate", "Heist", "Vacation", "Interview", "Reunion", "Disaster"],
        rating_weights: [0.05, 0.25, 0.45, 0.25, 0.0],
        length_range: [82, 112],
        cost_range: [13.99, 24.99],
    },
    CategoryProfile {
        name: "Documentary",
        templates: &[
            "The {noun} Project",
            "{location}: A {adjective} Portrait",
            "Inside the {noun}",
            "{adjective} {noun}",
        ],
        adjectives: &["Hidden", "Vanishing", "American", "Quiet", "Restless", "Uncharted"],
        nouns: &["Archive", "Harvest", "Frontier", "Assembly Line", "Reef", "Expedition"],
        rating_weights: [0.30, 0.40, 0.25, 0.05, 0.0],
        length_range: [70, 128],
        cost_range: [9.99, 17.99],
    },
    CategoryProfile {
        name: "Drama",
        templates: &[
            "The {adjective} {noun}",
            "{noun} in {location}",
            "{name}'s {noun}",
            "What the {noun} Left",
        ],
        adjectives: &["Broken", "Patient", "Unspoken", "Long", "Borrowed", "Honest"],
        nouns: &["Winter", "Confession", "Inheritance", "Silence", "Harvest", "Departure"],
        rating_weights: [0.02, 0.18, 0.45, 0.33, 0.02],
        length_range: [98, 152],
        cost_range: [12.99, 23.99],
    },
    CategoryProfile {
        name: "Family",
        templates: &[
            "The {noun} House",
            "{name} and {name}",
            "Our {adjective} {noun}",
            "{adjective} {noun} Holiday",
        ],
        adjectives: &["Crowded", "Borrowed", "Perfect", "Noisy", "Traveling", "Sunday"],
        nouns: &["Kitchen", "Road Trip", "Orchard", "Reunion", "Porch", "Recipe"],
        rating_weights: [0.40, 0.42, 0.16, 0.02, 0.0],
        length_range: [78, 110],
        cost_range: [11.99, 20.99],
    },
    CategoryProfile {
        name: "Foreign",
        templates: &[
            "{noun} of {location}",
            "The {adjective} {noun}",
            "{location} Nights",
            "A {noun} in {location}",
        ],
        adjectives: &["Distant", "Borrowed", "Paper", "Northern", "Amber", "Woven"],
        nouns: &["Garden", "Passport", "Letter", "Harbor", "Cafe", "Bicycle"],
        rating_weights: [0.08, 0.22, 0.38, 0.30, 0.02],
        length_range: [90, 140],
        cost_range: [10.99, 19.99],
    },
    CategoryProfile {
        name: "Games",
        templates: &[
            "{adjective} {noun}",
            "The {noun} Tournament",
            "{verb} to Win",
            "{name}'s Gambit",
        ],
        adjectives: &["Final", "Double", "High-Stakes", "Crooked", "Sudden-Death", "Blindfold"],
        nouns: &["Wager", "Scoreboard", "Checkmate", "Jackpot", "Play-Off", "Tiebreaker"],
        rating_weights: [0.10, 0.30, 0.40, 0.20, 0.0],
        length_range: [80, 118],
        cost_range: [12.99, 21.99],
    },
    CategoryProfile {
        name: "Horror",
        templates: &[
            "The {noun} Below",
            "{adjective} {noun}",
            "Don't {verb} the {noun}",
            "{noun} of {location}",
        ],
        adjectives: &["Hollow", "Crawling", "Sleepless", "Pale", "Whispering", "Starving"],
        nouns: &["Cellar", "Harvest", "Visitor", "Marsh", "Seance", "Lullaby", "Effigy"],
        rating_weights: [0.0, 0.02, 0.28, 0.60, 0.10],
        length_range: [84, 118],
        cost_range: [13.99, 25.99],
    },
    CategoryProfile {
        name: "Music",
        templates: &[
            "{adjective} {noun}",
            "The Last {noun}",
            "{name} Sings {location}",
            "{noun} and {noun}",
        ],
        adjectives: &["Electric", "Midnight", "Broken-String", "Backstage", "Analog", "Golden"],
        nouns: &["Encore", "Ballad", "Jukebox", "Rehearsal", "Chorus", "Crescendo"],
        rating_weights: [0.15, 0.35, 0.35, 0.15, 0.0],
        length_range: [85, 125],
        cost_range: [11.99, 21.99],
    },
    CategoryProfile {
        name: "New",
        templates: &[
            "{adjective} {noun}",
            "{noun} Tomorrow",
            "The {adjective} Hour",
            "{name} in {location}",
        ],
        adjectives: &["Untitled", "Sudden", "Modern", "Restless", "Second", "Bright"],
        nouns: &["Premiere", "Arrival", "Skyline", "Current", "Signal", "Season"],
        rating_weights: [0.08, 0.25, 0.42, 0.25, 0.0],
        length_range: [85, 125],
        cost_range: [14.99, 26.99],
    },
    CategoryProfile {
        name: "Sci-Fi",
        templates: &[
            "{noun} {location}",
            "The {adjective} Colony",
            "{verb} the Stars",
            "{adjective} {noun}",
        ],
        adjectives: &["Quantum", "Stranded", "Terraformed", "Synthetic", "Orbital", "Derelict"],
        nouns: &["Beacon", "Helix", "Continuum", "Drift", "Protocol", "Eclipse", "Relay"],
        rating_weights: [0.05, 0.25, 0.45, 0.25, 0.0],
        length_range: [92, 145],
        cost_range: [15.99, 28.99],
    },
    CategoryProfile {
        name: "Sports",
        templates: &[
            "The {adjective} Season",
            "{noun} at {location}",
            "{name}'s Comeback",
            "{adjective} {noun}",
        ],
        adjectives: &["Underdog", "Overtime", "Rookie", "Sidelined", "Undefeated", "Away-Game"],
        nouns: &["Relay", "Knockout", "Marathon", "Shutout", "Tryout", "Final Lap"],
        rating_weights: [0.15, 0.40, 0.35, 0.10, 0.0],
        length_range: [88, 122],
        cost_range: [12.99, 22.99],
    },
    CategoryProfile {
        name: "Travel",
        templates: &[
            "{location} by {noun}",
            "The {adjective} Road",
            "{verb} {location}",
            "{noun} to {location}",
        ],
        adjectives: &["Winding", "Unmapped", "Slow", "Borrowed", "Overnight", "Coastal"],
        nouns: &["Ferry", "Caravan", "Postcard", "Detour", "Compass", "Layover"],
        rating_weights: [0.30, 0.40, 0.25, 0.05, 0.0],
        length_range: [75, 115],
        cost_range: [10.99, 19.99],
    },
];

pub fn category_names() -> impl Iterator<Item = &'static str> {
    CATEGORIES.iter().map(|c| c.name)
}

pub fn is_known_category(name: &str) -> bool {
    CATEGORIES.iter().any(|c| c.name == name)
}

pub fn category_profile(name: &str) -> Option<&'static CategoryProfile> {
    CATEGORIES.iter().find(|c| c.name == name)
}

/// Substitute every `{key}` in the template from the table. Unknown keys are
/// left in place so a bad template is visible in the output, not a panic.
pub fn render(template: &str, table: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        match rest[open..].find('}') {
            Some(close_offset) => {
                let key = &rest[open + 1..open + close_offset];
                match table.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &rest[open + close_offset + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

/// A generated film: title, description, and rating drawn from the
/// category's configured distribution.
#[derive(Debug, Clone)]
pub struct GeneratedTitle {
    pub title: String,
    pub description: String,
    pub rating: String,
}

pub fn generate_film_title(category: &CategoryProfile, rng: &mut SimRng) -> GeneratedTitle {
    let template = category.templates[rng.index(category.templates.len())];

    let adjective = category.adjectives[rng.index(category.adjectives.len())];
    let noun = category.nouns[rng.index(category.nouns.len())];
    let name = NAMES[rng.index(NAMES.len())];
    let location = LOCATIONS[rng.index(LOCATIONS.len())];
    let verb = VERBS[rng.index(VERBS.len())];

    let table = [
        ("adjective", adjective),
        ("noun", noun),
        ("name", name),
        ("location", location),
        ("verb", verb),
    ];
    let title = render(template, &table);

    let subject = DESCRIPTION_SUBJECTS[rng.index(DESCRIPTION_SUBJECTS.len())];
    let twist = DESCRIPTION_TWISTS[rng.index(DESCRIPTION_TWISTS.len())];
    let desc_adjective = category.adjectives[rng.index(category.adjectives.len())];
    let description = format!(
        "A {} {} of {} {} in {}",
        desc_adjective,
        category.name.to_lowercase(),
        subject,
        twist,
        location
    );

    let rating_idx = rng.weighted_index(&category.rating_weights);
    let rating = RATINGS[rating_idx].to_string();

    GeneratedTitle {
        title,
        description,
        rating,
    }
}

/// Sample length (minutes) from the category range.
pub fn sample_length(category: &CategoryProfile, rng: &mut SimRng) -> i64 {
    rng.range_i64(category.length_range[0], category.length_range[1])
}

/// Sample replacement cost from the category range, cents precision.
pub fn sample_replacement_cost(category: &CategoryProfile, rng: &mut SimRng) -> f64 {
    let cost = rng.range_f64(category.cost_range[0], category.cost_range[1]);
    (cost * 100.0).round() / 100.0
}

/// Rental price is a fixed fraction of replacement cost, cents precision.
pub fn rental_price(replacement_cost: f64) -> f64 {
    (replacement_cost * RENTAL_PRICE_RATIO * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixteen_categories() {
        assert_eq!(CATEGORIES.len(), 16);
        assert!(is_known_category("Horror"));
        assert!(!is_known_category("Knitting"));
    }

    #[test]
    fn render_substitutes_known_keys() {
        let out = render(
            "{name} and the {noun}",
            &[("name", "Greta"), ("noun", "Lantern")],
        );
        assert_eq!(out, "Greta and the Lantern");
    }

    #[test]
    fn render_leaves_unknown_keys_visible() {
        let out = render("The {mystery} Hour", &[("noun", "Lantern")]);
        assert_eq!(out, "The {mystery} Hour");
    }

    #[test]
    fn generated_titles_have_no_placeholders() {
        let mut rng = SimRng::new(7);
        for category in &CATEGORIES {
            for _ in 0..20 {
                let generated = generate_film_title(category, &mut rng);
                assert!(
                    !generated.title.contains('{'),
                    "unresolved placeholder in '{}'",
                    generated.title
                );
                assert!(RATINGS.contains(&generated.rating.as_str()));
                assert!(!generated.description.is_empty());
            }
        }
    }

    #[test]
    fn rental_price_is_fifth_of_cost() {
        assert!((rental_price(20.0) - 4.0).abs() < 1e-9);
        assert!((rental_price(14.95) - 2.99).abs() < 1e-9);
    }

    #[test]
    fn children_films_never_rated_r() {
        let children = category_profile("Children").unwrap();
        assert_eq!(children.rating_weights[3], 0.0);
        assert_eq!(children.rating_weights[4], 0.0);
    }
}

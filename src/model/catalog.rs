use anyhow::{Result, anyhow};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 3] = [TimeOfDay::Morning, TimeOfDay::Afternoon, TimeOfDay::Night];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Night => "night",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Condition {
    Clear,
    Rain,
    Clouds,
    Snow,
    Thunderstorm,
}

impl Condition {
    pub const ALL: [Condition; 5] = [
        Condition::Clear,
        Condition::Rain,
        Condition::Clouds,
        Condition::Snow,
        Condition::Thunderstorm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Clear => "clear",
            Condition::Rain => "rain",
            Condition::Clouds => "clouds",
            Condition::Snow => "snow",
            Condition::Thunderstorm => "thunderstorm",
        }
    }
}

/// A time-of-day / weather-condition pair. Used both as the search topic and as
/// the stem of the exported file name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category {
    pub time: TimeOfDay,
    pub condition: Condition,
}

impl Category {
    pub const fn new(time: TimeOfDay, condition: Condition) -> Self {
        Self { time, condition }
    }

    /// All categories in table order: times of day outermost, conditions innermost.
    pub fn all() -> Vec<Category> {
        TimeOfDay::ALL
            .into_iter()
            .flat_map(|t| Condition::ALL.into_iter().map(move |c| Category::new(t, c)))
            .collect()
    }

    pub fn id(&self) -> String {
        format!("{}_{}", self.time.as_str(), self.condition.as_str())
    }

    pub fn phrase(&self) -> &'static str {
        use Condition::*;
        use TimeOfDay::*;
        match (self.time, self.condition) {
            (Morning, Clear) => "sunrise clear sky golden hour",
            (Morning, Rain) => "rainy morning landscape nature raindrops",
            (Morning, Clouds) => "cloudy morning sky sunrise",
            (Morning, Snow) => "snowy morning winter landscape",
            (Morning, Thunderstorm) => "morning thunderstorm lightning",
            (Afternoon, Clear) => "sunny afternoon clear blue sky",
            (Afternoon, Rain) => "rainy afternoon storm clouds",
            (Afternoon, Clouds) => "cloudy afternoon sky",
            (Afternoon, Snow) => "snowy afternoon winter scene",
            (Afternoon, Thunderstorm) => "afternoon thunderstorm lightning",
            (Night, Clear) => "starry night sky moon",
            (Night, Rain) => "rainy night city lights",
            (Night, Clouds) => "cloudy night sky moon",
            (Night, Snow) => "snowy night winter scene",
            (Night, Thunderstorm) => "night thunderstorm lightning",
        }
    }

    pub fn position(&self) -> usize {
        let t = TimeOfDay::ALL.iter().position(|t| *t == self.time).unwrap_or(0);
        let c = Condition::ALL
            .iter()
            .position(|c| *c == self.condition)
            .unwrap_or(0);
        t * Condition::ALL.len() + c
    }

    /// The following category in table order, wrapping after the last one.
    pub fn next(&self) -> Category {
        let all = Category::all();
        all[(self.position() + 1) % all.len()]
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::new(TimeOfDay::Morning, Condition::Clear)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.time.as_str(), self.condition.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Category::all()
            .into_iter()
            .find(|c| c.id() == s)
            .ok_or_else(|| anyhow!("Unknown category: {}", s))
    }
}

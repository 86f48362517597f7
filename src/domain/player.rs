use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A player's holdings. Signed: a player may owe the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Applies a signed change, or `None` if the result leaves the decimal range.
    pub fn checked_add(self, delta: Decimal) -> Option<Self> {
        self.0.checked_add(delta).map(Self)
    }
}

/// Rounds half away from zero, so `0.125` shows as `0.13`.
pub(crate) fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", round_cents(self.0))
    }
}

/// A registered participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Unique, case-sensitive key.
    pub name: String,
    pub balance: Balance,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_balance(name, Balance::ZERO)
    }

    pub fn with_balance(name: impl Into<String>, balance: Balance) -> Self {
        Self {
            name: name.into(),
            balance,
        }
    }
}

/// The player mapping, keyed by name and kept in registration order.
///
/// Registration order matters: it is the tiebreak for the ranking. On disk the
/// book is a JSON object `{ "<name>": { "name": .., "balance": .. } }` whose keys
/// appear in that same order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayerBook {
    players: Vec<Player>,
}

impl PlayerBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.name == name)
    }

    /// Inserts a player, replacing any entry with the same name in place.
    ///
    /// Returns the replaced player, if there was one.
    pub fn upsert(&mut self, player: Player) -> Option<Player> {
        match self.get_mut(&player.name) {
            Some(existing) => Some(std::mem::replace(existing, player)),
            None => {
                self.players.push(player);
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn clear(&mut self) {
        self.players.clear();
    }
}

impl FromIterator<Player> for PlayerBook {
    fn from_iter<I: IntoIterator<Item = Player>>(iter: I) -> Self {
        let mut book = PlayerBook::new();
        for player in iter {
            book.upsert(player);
        }
        book
    }
}

impl Serialize for PlayerBook {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.players.len()))?;
        for player in &self.players {
            map.serialize_entry(&player.name, player)?;
        }
        map.end()
    }
}

struct PlayerBookVisitor;

impl<'de> Visitor<'de> for PlayerBookVisitor {
    type Value = PlayerBook;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of player name to player record")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut book = PlayerBook::new();
        while let Some((key, mut player)) = access.next_entry::<String, Player>()? {
            // The key is what lookups use, so it wins over the embedded name.
            player.name = key;
            book.upsert(player);
        }
        Ok(book)
    }
}

impl<'de> Deserialize<'de> for PlayerBook {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(PlayerBookVisitor)
    }
}

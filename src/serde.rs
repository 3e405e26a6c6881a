//! Serialization of [`OrderedIndex`] as a map, behind the `serde` feature.
//!
//! Entries serialize in key order.  Deserialization collects the map's
//! entries and bulk builds, so a deserialized index always has minimal
//! height regardless of the shape it was serialized from.

use std::fmt::Formatter;
use std::marker::PhantomData;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::OrderedIndex;

impl<K, V> Serialize for OrderedIndex<K, V>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct IndexVisitor<K, V> {
    entries: PhantomData<(K, V)>,
}

impl<'de, K, V> Visitor<'de> for IndexVisitor<K, V>
where
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
{
    type Value = OrderedIndex<K, V>;

    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(entry) = access.next_entry()? {
            pairs.push(entry);
        }
        Ok(OrderedIndex::from_unsorted(pairs))
    }
}

impl<'de, K, V> Deserialize<'de> for OrderedIndex<K, V>
where
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(IndexVisitor {
            entries: PhantomData,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_test::{assert_de_tokens, assert_tokens, Token};

    #[test]
    fn tokens_in_key_order() {
        let m: OrderedIndex<u16, char> =
            [(3, 'c'), (1, 'a'), (2, 'b')].into_iter().collect();

        assert_tokens(
            &m,
            &[
                Token::Map { len: Some(3) },
                Token::U16(1),
                Token::Char('a'),
                Token::U16(2),
                Token::Char('b'),
                Token::U16(3),
                Token::Char('c'),
                Token::MapEnd,
            ],
        );
    }

    #[test]
    fn deserialize_unordered_map_balances() {
        let expect =
            OrderedIndex::from_sorted([(1u16, 'a'), (2, 'b'), (3, 'c')]);

        assert_de_tokens(
            &expect,
            &[
                Token::Map { len: None },
                Token::U16(3),
                Token::Char('c'),
                Token::U16(1),
                Token::Char('a'),
                Token::U16(2),
                Token::Char('b'),
                Token::MapEnd,
            ],
        );
    }
}

//! Specialized rule sets
//!
//! Each rule set is an immutable handle onto a chain of builder calls.
//! Builders return a new rule set; the receiver is never modified.
//!
//! | Rule set | Working value | Factory |
//! |----------|---------------|---------|
//! | [`StringRuleSet`] | `str` | [`string()`] |
//! | [`IntRuleSet<T>`] | `T` | [`int()`] |
//! | [`DomainRuleSet`] | `str` | [`domain()`] |
//! | [`EmailRuleSet`] | `str` | [`email()`] |
//! | [`IpRuleSet`] | `IpAddr` | [`ip()`] |
//! | [`QueryRuleSet`] | `str` | [`query()`] |
//! | [`UriRuleSet`] | `str` | [`uri()`] |

pub mod domain;
pub mod email;
pub mod int;
pub mod ip;
pub mod query;
pub mod string;
pub(crate) mod tld;
pub mod uri;

pub use domain::{DomainRuleSet, domain};
pub use email::{EmailRuleSet, email};
pub use int::{IntRuleSet, Integer, int};
pub use ip::{IpRuleSet, ip, is_private};
pub use query::{QueryRuleSet, decode, encode, query};
pub use string::{StringRuleSet, string};
pub use uri::{UriParts, UriRuleSet, uri};

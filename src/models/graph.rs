use std::collections::HashMap;

use super::{round2, Account, Item, ItemId, RatingAverages, Ratings, Review};
use crate::error::{AppError, AppResult};

/// Handle of an item inside a [`Graph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey(pub(crate) usize);

/// Handle of an account inside a [`Graph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountKey(pub(crate) usize);

/// Handle of a review edge inside a [`Graph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReviewKey(pub(crate) usize);

/// Either side of the bipartite graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    Account(AccountKey),
    Item(ItemKey),
}

impl Node {
    pub fn as_item(&self) -> Option<ItemKey> {
        match self {
            Node::Item(key) => Some(*key),
            Node::Account(_) => None,
        }
    }

    /// An item with a single reviewer leads nowhere but back.
    pub fn is_dead_end(&self, graph: &Graph) -> bool {
        match self {
            Node::Item(key) => graph.item(*key).reviewer_count() == 1,
            Node::Account(_) => false,
        }
    }
}

/// Bipartite preference graph of accounts and items joined by reviews.
///
/// All insertions are append-only: nodes, reviews and friend links are never
/// removed, so keys handed out stay valid for the graph's lifetime.
#[derive(Debug, Default)]
pub struct Graph {
    items: Vec<Item>,
    item_index: HashMap<ItemId, ItemKey>,
    accounts: Vec<Account>,
    account_index: HashMap<String, AccountKey>,
    reviews: Vec<Review>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_item(&mut self, item: Item) -> AppResult<ItemKey> {
        if self.item_index.contains_key(&item.id) {
            return Err(AppError::InvalidInput(format!(
                "item {} already exists",
                item.id
            )));
        }
        let key = ItemKey(self.items.len());
        self.item_index.insert(item.id, key);
        self.items.push(item);
        Ok(key)
    }

    pub fn insert_account(&mut self, account: Account) -> AppResult<AccountKey> {
        if self.account_index.contains_key(&account.username) {
            return Err(AppError::InvalidInput(format!(
                "account '{}' already exists",
                account.username
            )));
        }
        let key = AccountKey(self.accounts.len());
        self.account_index.insert(account.username.clone(), key);
        self.accounts.push(account);
        Ok(key)
    }

    /// Links an account and an item with a new review, registering the edge
    /// on both endpoints.
    pub fn add_review(
        &mut self,
        account: AccountKey,
        item: ItemKey,
        ratings: Ratings,
    ) -> AppResult<ReviewKey> {
        if self.account(account).has_reviewed(item) {
            return Err(AppError::AlreadyLinked {
                username: self.account(account).username.clone(),
                item: self.item(item).id,
            });
        }

        let key = ReviewKey(self.reviews.len());
        self.reviews.push(Review {
            account,
            item,
            ratings,
        });
        self.accounts[account.0].reviews.push((item, key));
        self.items[item.0].reviews.push((account, key));
        Ok(key)
    }

    /// Adds a symmetric friend link. Linking existing friends again is a no-op.
    pub fn add_friends(&mut self, a: AccountKey, b: AccountKey) -> AppResult<()> {
        if a == b {
            return Err(AppError::InvalidInput(format!(
                "account '{}' cannot befriend itself",
                self.account(a).username
            )));
        }
        if self.account(a).friends.contains(&b) {
            tracing::debug!(
                account = %self.account(a).username,
                friend = %self.account(b).username,
                "Accounts are already friends"
            );
            return Ok(());
        }
        self.accounts[a.0].friends.push(b);
        self.accounts[b.0].friends.push(a);
        Ok(())
    }

    pub fn item(&self, key: ItemKey) -> &Item {
        &self.items[key.0]
    }

    pub fn account(&self, key: AccountKey) -> &Account {
        &self.accounts[key.0]
    }

    pub(crate) fn account_mut(&mut self, key: AccountKey) -> &mut Account {
        &mut self.accounts[key.0]
    }

    pub fn review(&self, key: ReviewKey) -> &Review {
        &self.reviews[key.0]
    }

    /// Looks up an item by catalog id
    pub fn item_key(&self, id: ItemId) -> AppResult<ItemKey> {
        self.item_index
            .get(&id)
            .copied()
            .ok_or_else(|| AppError::NotFound(format!("item {}", id)))
    }

    /// Looks up an account by username
    pub fn account_key(&self, username: &str) -> AppResult<AccountKey> {
        self.account_index
            .get(username)
            .copied()
            .ok_or_else(|| AppError::NotFound(format!("account '{}'", username)))
    }

    pub fn contains_account(&self, username: &str) -> bool {
        self.account_index.contains_key(username)
    }

    /// Items in insertion order
    pub fn items(&self) -> impl Iterator<Item = (ItemKey, &Item)> {
        self.items.iter().enumerate().map(|(i, item)| (ItemKey(i), item))
    }

    /// Accounts in insertion order
    pub fn accounts(&self) -> impl Iterator<Item = (AccountKey, &Account)> {
        self.accounts
            .iter()
            .enumerate()
            .map(|(i, account)| (AccountKey(i), account))
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn review_count(&self) -> usize {
        self.reviews.len()
    }

    /// Mean of each category over the item's reviews, rounded to two
    /// decimals. All-zero for an unreviewed item. Recomputed on every call.
    pub fn average_ratings(&self, item: ItemKey) -> RatingAverages {
        let ratings = self
            .item(item)
            .reviews
            .iter()
            .map(|(_, review)| &self.review(*review).ratings);
        RatingAverages::mean_of(ratings).map(round2)
    }

    /// Nodes sharing a review with `node`, in review insertion order
    pub fn neighbors(&self, node: Node) -> impl Iterator<Item = (Node, ReviewKey)> + '_ {
        let (given, received): (&[(ItemKey, ReviewKey)], &[(AccountKey, ReviewKey)]) = match node
        {
            Node::Account(key) => (self.account(key).reviews.as_slice(), &[][..]),
            Node::Item(key) => (&[][..], self.item(key).reviews.as_slice()),
        };
        given
            .iter()
            .map(|(item, review)| (Node::Item(*item), *review))
            .chain(
                received
                    .iter()
                    .map(|(account, review)| (Node::Account(*account), *review)),
            )
    }
}

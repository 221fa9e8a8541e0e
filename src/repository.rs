use crate::sentiment::SentimentLabel;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};

pub const REVIEWS_COLLECTION: &str = "reviews";

/// Stored review record. Insert-only; never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDocument {
    pub product_id: String,
    pub review: String,
    pub sentiment: SentimentLabel,
    pub confidence: f64,
}

/// Projection used when computing statistics.
#[derive(Debug, Deserialize)]
struct SentimentOnly {
    sentiment: SentimentLabel,
}

/// Proportions of each label among a product's reviews, rounded to two
/// decimal places.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentDistribution {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

/// Access to the `reviews` collection. Cheap to clone; the underlying client
/// manages its own connection pool.
#[derive(Clone)]
pub struct ReviewRepository {
    reviews: Collection<ReviewDocument>,
}

impl ReviewRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            reviews: database.collection(REVIEWS_COLLECTION),
        }
    }

    /// Persist one review with its predicted sentiment.
    pub async fn insert_review(&self, document: ReviewDocument) -> mongodb::error::Result<()> {
        self.reviews.insert_one(document).await?;
        Ok(())
    }

    /// Scan all reviews for a product and count labels. Returns `None` when
    /// no reviews exist, which callers surface as "not found" rather than a
    /// zero-filled distribution.
    pub async fn sentiment_distribution(
        &self,
        product_id: &str,
    ) -> mongodb::error::Result<Option<SentimentDistribution>> {
        let cursor = self
            .reviews
            .clone_with_type::<SentimentOnly>()
            .find(doc! { "product_id": product_id })
            .projection(doc! { "sentiment": 1, "_id": 0 })
            .await?;

        let sentiments: Vec<SentimentOnly> = cursor.try_collect().await?;
        if sentiments.is_empty() {
            return Ok(None);
        }

        let mut positive = 0usize;
        let mut neutral = 0usize;
        let mut negative = 0usize;
        for entry in &sentiments {
            match entry.sentiment {
                SentimentLabel::Positive => positive += 1,
                SentimentLabel::Neutral => neutral += 1,
                SentimentLabel::Negative => negative += 1,
            }
        }

        Ok(Some(distribution_from_counts(positive, neutral, negative)))
    }
}

fn distribution_from_counts(positive: usize, neutral: usize, negative: usize) -> SentimentDistribution {
    let total = (positive + neutral + negative) as f64;
    SentimentDistribution {
        positive: round2(positive as f64 / total),
        neutral: round2(neutral as f64 / total),
        negative: round2(negative as f64 / total),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

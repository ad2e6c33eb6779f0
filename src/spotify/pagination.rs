use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    error::Result,
    spotify::client::{RequestDescriptor, SpotifyClient},
    types::ApiListPage,
};

impl SpotifyClient {
    /// Walks a paginated collection and folds every page into `seed`.
    ///
    /// Pages are requested strictly one after another, starting with
    /// `initial` and following each page's `next` URL with the same method,
    /// headers and body. The walk stops at the first page whose `next` is
    /// null or empty. Every page goes through [`SpotifyClient::execute`], so
    /// refresh and rate-limit handling applies to each of them.
    ///
    /// A failing page aborts the walk and the partial accumulator is dropped.
    pub async fn reduce_all_pages<T, A, F>(
        &self,
        initial: RequestDescriptor,
        mut fold: F,
        seed: A,
    ) -> Result<A>
    where
        T: DeserializeOwned,
        F: FnMut(A, ApiListPage<T>) -> A,
    {
        let mut acc = seed;
        let mut next = Some(initial);
        let mut fetched = 0;

        while let Some(descriptor) = next.take() {
            let page: ApiListPage<T> = self.execute_json(&descriptor).await?;
            fetched += 1;
            debug!(
                page = fetched,
                items = page.items.len(),
                offset = page.offset,
                total = page.total,
                "fetched page"
            );

            next = page
                .next
                .as_deref()
                .filter(|url| !url.is_empty())
                .map(|url| descriptor.with_url(url));
            acc = fold(acc, page);
        }

        Ok(acc)
    }

    /// Concatenates the items of every page, in server order.
    pub async fn collect_all_pages<T: DeserializeOwned>(
        &self,
        initial: RequestDescriptor,
    ) -> Result<Vec<T>> {
        self.reduce_all_pages(
            initial,
            |mut acc: Vec<T>, page: ApiListPage<T>| {
                acc.extend(page.items);
                acc
            },
            Vec::new(),
        )
        .await
    }
}

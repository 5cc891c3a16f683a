/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - ex: identity pipeline, ticket decoder など
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - request ごとの principal はここに置かない (request extensions の SecurityContext)
 */
use std::sync::Arc;

use crate::services::identity::RequestIdentityPipeline;
use crate::services::ticket::TicketDecoder;

#[derive(Clone, Debug)]
pub struct AppState {
    pub pipeline: Arc<RequestIdentityPipeline>,
    pub tickets: Arc<TicketDecoder>,
    pub ticket_cookie_name: Arc<str>,
}

impl AppState {
    pub fn new(
        pipeline: Arc<RequestIdentityPipeline>,
        tickets: Arc<TicketDecoder>,
        ticket_cookie_name: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            pipeline,
            tickets,
            ticket_cookie_name: ticket_cookie_name.into(),
        }
    }
}

use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{
    EventHandler, EventProducer, Handler, InvoiceAnnulledEvent, InvoicePaidEvent, WalletRemovedEvent,
};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub invoice_paid_producer: Vec<EventProducer<InvoicePaidEvent>>,
    pub invoice_annulled_producer: Vec<EventProducer<InvoiceAnnulledEvent>>,
    pub wallet_removed_producer: Vec<EventProducer<WalletRemovedEvent>>,
}

pub struct EventHandlers {
    pub on_invoice_paid: Option<EventHandler<InvoicePaidEvent>>,
    pub on_invoice_annulled: Option<EventHandler<InvoiceAnnulledEvent>>,
    pub on_wallet_removed: Option<EventHandler<WalletRemovedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_invoice_paid = hooks.on_invoice_paid.map(|f| EventHandler::new(buffer_size, f));
        let on_invoice_annulled = hooks.on_invoice_annulled.map(|f| EventHandler::new(buffer_size, f));
        let on_wallet_removed = hooks.on_wallet_removed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_invoice_paid, on_invoice_annulled, on_wallet_removed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_invoice_paid {
            result.invoice_paid_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_invoice_annulled {
            result.invoice_annulled_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_wallet_removed {
            result.wallet_removed_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_invoice_paid {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_invoice_annulled {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_wallet_removed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_invoice_paid: Option<Handler<InvoicePaidEvent>>,
    pub on_invoice_annulled: Option<Handler<InvoiceAnnulledEvent>>,
    pub on_wallet_removed: Option<Handler<WalletRemovedEvent>>,
}

impl EventHooks {
    pub fn on_invoice_paid<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(InvoicePaidEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_invoice_paid = Some(Arc::new(f));
        self
    }

    pub fn on_invoice_annulled<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(InvoiceAnnulledEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_invoice_annulled = Some(Arc::new(f));
        self
    }

    pub fn on_wallet_removed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(WalletRemovedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_wallet_removed = Some(Arc::new(f));
        self
    }
}

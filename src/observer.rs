use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callbacks fired synchronously, in subscription order, on every event
pub struct ObserverList<E> {
	observers: Vec<(SubscriptionId, Box<dyn FnMut(&E)>)>,
	next_id:   u64,
}

impl<E> Default for ObserverList<E> {
	fn default() -> Self { Self { observers: Vec::new(), next_id: 0 } }
}

impl<E> ObserverList<E> {
	pub fn subscribe(&mut self, observer: impl FnMut(&E) + 'static) -> SubscriptionId {
		let id = SubscriptionId(self.next_id);
		self.next_id += 1;
		self.observers.push((id, Box::new(observer)));
		id
	}

	pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
		let before = self.observers.len();
		self.observers.retain(|(existing, _)| *existing != id);
		self.observers.len() != before
	}

	pub fn notify(&mut self, event: &E) {
		for (_, observer) in &mut self.observers {
			observer(event);
		}
	}

	pub fn len(&self) -> usize { self.observers.len() }

	pub fn is_empty(&self) -> bool { self.observers.is_empty() }
}

impl<E> fmt::Debug for ObserverList<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ObserverList").field("observers", &self.observers.len()).finish()
	}
}

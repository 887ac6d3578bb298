// ── Message vocabulary ────────────────────────────────────────────────────────

#[cfg(test)]
mod message_tests {
    use wcs_core::{BinId, Cell, SimTime, TruckId};

    use crate::*;

    #[test]
    fn performative_names() {
        let names: Vec<_> = Performative::ALL.iter().map(|p| p.as_str()).collect();
        assert_eq!(
            names,
            ["cfp", "propose", "refuse", "accept-proposal", "reject-proposal", "inform"]
        );
    }

    #[test]
    fn payload_reports_its_performative() {
        assert_eq!(Payload::Propose { cost: 3.0 }.performative(), Performative::Propose);
        assert_eq!(Payload::Refuse(RefuseReason::Busy).performative(), Performative::Refuse);
        assert_eq!(
            Payload::Inform(InformStatus::CollectionComplete).performative(),
            Performative::Inform
        );
    }

    #[test]
    fn address_display_uses_agent_names() {
        assert_eq!(Address::from(BinId(0)).to_string(), "bin1");
        assert_eq!(Address::from(TruckId(2)).to_string(), "truck3");
    }

    #[test]
    fn status_strings() {
        assert_eq!(RefuseReason::NoFuel.as_str(), "NO_FUEL");
        assert_eq!(
            InformStatus::TruckMalfunction { repair_time: 2.0 }.as_str(),
            "TRUCK_MALFUNCTION"
        );
        assert_eq!(RejectReason::BetterProposalSelected.as_str(), "better_proposal_selected");
    }

    #[test]
    fn validate_accepts_sane_bodies() {
        let cfp = Payload::Cfp(CallForProposals {
            position:        Cell::new(1, 2),
            level:           85.0,
            time:            SimTime::START,
            last_collection: None,
            retry:           false,
        });
        assert!(cfp.validate().is_ok());
        assert!(Payload::Propose { cost: 0.0 }.validate().is_ok());
        assert!(Payload::Refuse(RefuseReason::Full).validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_finite_or_negative_numbers() {
        assert!(matches!(
            Payload::Propose { cost: f64::NAN }.validate(),
            Err(FabricError::Malformed { performative: Performative::Propose, .. })
        ));
        let accept = Payload::AcceptProposal(Acceptance {
            position: Cell::new(0, 0),
            level:    -1.0,
            time:     SimTime::START,
        });
        assert!(accept.validate().is_err());
        let inform = Payload::Inform(InformStatus::TruckMalfunction { repair_time: f64::INFINITY });
        assert!(inform.validate().is_err());
    }
}

// ── Templates ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod template_tests {
    use crate::*;

    #[test]
    fn single_performative() {
        let t = Template::of(Performative::Cfp);
        assert!(t.matches(Performative::Cfp));
        assert!(!t.matches(Performative::Propose));
    }

    #[test]
    fn composition_with_or() {
        let t = Performative::Propose | Performative::Refuse | Performative::Inform;
        assert!(t.matches(Performative::Propose));
        assert!(t.matches(Performative::Refuse));
        assert!(t.matches(Performative::Inform));
        assert!(!t.matches(Performative::Cfp));
        assert!(!t.matches(Performative::AcceptProposal));
    }

    #[test]
    fn any_and_none() {
        for p in Performative::ALL {
            assert!(Template::ANY.matches(p));
            assert!(!Template::NONE.matches(p));
        }
        assert!(Template::NONE.is_empty());
    }
}

// ── Routing ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod post_tests {
    use std::time::Duration;

    use wcs_core::{BinId, TruckId};

    use crate::*;

    const BIN: Address = Address::Bin(BinId(0));
    const TRUCK: Address = Address::Truck(TruckId(0));

    #[tokio::test]
    async fn routes_by_template() {
        let office = PostOffice::new();
        let mut accepts = office.register(TRUCK, Template::of(Performative::AcceptProposal));
        let mut rejects = office.register(TRUCK, Template::of(Performative::RejectProposal));

        let rejection = Rejection {
            reason:        RejectReason::BetterProposalSelected,
            selected_cost: 2.0,
            your_cost:     5.0,
        };
        office.send(BIN, TRUCK, Payload::RejectProposal(rejection.clone())).unwrap();

        assert!(accepts.try_receive().is_none());
        let env = rejects.try_receive().unwrap();
        assert_eq!(env.from, BIN);
        assert_eq!(env.to, TRUCK);
        assert_eq!(env.payload, Payload::RejectProposal(rejection));
    }

    #[tokio::test]
    async fn first_matching_route_wins() {
        let office = PostOffice::new();
        let mut first = office.register(BIN, Template::ANY);
        let mut second = office.register(BIN, Template::of(Performative::Inform));
        office.send(TRUCK, BIN, Payload::Inform(InformStatus::CollectionComplete)).unwrap();
        assert!(first.try_receive().is_some());
        assert!(second.try_receive().is_none());
    }

    #[tokio::test]
    async fn fifo_per_pair() {
        let office = PostOffice::new();
        let mut inbox = office.register(BIN, Template::ANY);
        for cost in [1.0, 2.0, 3.0] {
            office.send(TRUCK, BIN, Payload::Propose { cost }).unwrap();
        }
        let costs: Vec<f64> = std::iter::from_fn(|| inbox.try_receive())
            .map(|e| match e.payload {
                Payload::Propose { cost } => cost,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(costs, [1.0, 2.0, 3.0]);
    }

    #[tokio::test]
    async fn unknown_recipient_and_missing_route() {
        let office = PostOffice::new();
        assert_eq!(
            office.send(BIN, TRUCK, Payload::Propose { cost: 1.0 }),
            Err(FabricError::UnknownRecipient(TRUCK))
        );
        let _inbox = office.register(TRUCK, Template::of(Performative::Cfp));
        assert_eq!(
            office.send(BIN, TRUCK, Payload::Propose { cost: 1.0 }),
            Err(FabricError::NoRoute { to: TRUCK, performative: Performative::Propose })
        );
    }

    #[tokio::test]
    async fn postman_post_reports_failure_without_erroring() {
        let office = PostOffice::new();
        let postman = office.postman(BIN);
        assert_eq!(postman.owner(), BIN);
        assert!(!postman.post(TruckId(0), Payload::Refuse(RefuseReason::Busy)));
        let _inbox = office.register(TRUCK, Template::ANY);
        assert!(postman.post(TruckId(0), Payload::Refuse(RefuseReason::Busy)));
    }

    #[tokio::test(start_paused = true)]
    async fn receive_times_out() {
        let office = PostOffice::new();
        let mut inbox = office.register(BIN, Template::ANY);
        let started = tokio::time::Instant::now();
        assert!(inbox.receive(Duration::from_secs(5)).await.is_none());
        assert!(started.elapsed() >= Duration::from_secs(5));
        assert!(!inbox.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn deregister_closes_inbox() {
        let office = PostOffice::new();
        let mut inbox = office.register(BIN, Template::ANY);
        assert!(office.is_registered(BIN));
        office.deregister(BIN);
        assert!(!office.is_registered(BIN));
        assert!(inbox.receive(Duration::from_secs(1)).await.is_none());
        assert!(inbox.is_closed());
    }
}

// ── Agent runtime ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod agent_tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use wcs_core::{BinId, TruckId};

    use crate::*;

    const BIN: Address = Address::Bin(BinId(0));
    const TRUCK: Address = Address::Truck(TruckId(0));

    // ── Helpers ───────────────────────────────────────────────────────────

    struct Counter(Arc<AtomicUsize>);

    #[async_trait]
    impl PeriodicBehaviour for Counter {
        async fn on_tick(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Answers every CFP with a fixed proposal.
    struct FixedBidder {
        postman: Postman,
        cost:    f64,
    }

    #[async_trait]
    impl CyclicBehaviour for FixedBidder {
        async fn run_once(&mut self, inbox: &mut Inbox) {
            if let Some(env) = inbox.receive(Duration::from_secs(10)).await {
                self.postman.post(env.from, Payload::Propose { cost: self.cost });
            }
        }
    }

    // ── Tests ─────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn periodic_behaviour_ticks_on_period() {
        let office = PostOffice::new();
        let count = Arc::new(AtomicUsize::new(0));
        let mut handle = AgentBuilder::new(BIN, &office)
            .periodic(Duration::from_secs(1), Counter(count.clone()))
            .start();

        tokio::time::sleep(Duration::from_millis(3500)).await;
        // Ticks at 0s, 1s, 2s and 3s.
        assert_eq!(count.load(Ordering::SeqCst), 4);
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cyclic_behaviour_answers_messages() {
        let office = PostOffice::new();
        let builder = AgentBuilder::new(TRUCK, &office);
        let postman = builder.postman();
        let mut handle = builder
            .cyclic(Performative::Cfp, FixedBidder { postman, cost: 7.5 })
            .start();

        let mut bin_inbox = office.register(BIN, Template::ANY);
        let cfp = CallForProposals {
            position:        wcs_core::Cell::new(3, 3),
            level:           90.0,
            time:            wcs_core::SimTime::START,
            last_collection: None,
            retry:           false,
        };
        office.send(BIN, TRUCK, Payload::Cfp(cfp)).unwrap();

        let reply = bin_inbox.receive(Duration::from_secs(1)).await.unwrap();
        assert_eq!(reply.from, TRUCK);
        assert_eq!(reply.payload, Payload::Propose { cost: 7.5 });
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_aborts_and_deregisters() {
        let office = PostOffice::new();
        let count = Arc::new(AtomicUsize::new(0));
        let builder = AgentBuilder::new(TRUCK, &office);
        let postman = builder.postman();
        let mut handle = builder
            .periodic(Duration::from_secs(1), Counter(count.clone()))
            .cyclic(Performative::Cfp, FixedBidder { postman, cost: 1.0 })
            .start();
        assert!(office.is_registered(TRUCK));
        assert!(handle.is_running());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        handle.stop().await;
        let frozen = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(count.load(Ordering::SeqCst), frozen);
        assert!(!office.is_registered(TRUCK));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_returns_after_behaviours_are_dropped() {
        let office = PostOffice::new();
        let count = Arc::new(AtomicUsize::new(0));
        let mut handle = AgentBuilder::new(BIN, &office)
            .periodic(Duration::from_secs(1), Counter(count.clone()))
            .start();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(Arc::strong_count(&count), 2);

        // No yield between stop and the checks.
        handle.stop().await;
        assert_eq!(Arc::strong_count(&count), 1);
        assert!(!handle.is_running());
    }
}

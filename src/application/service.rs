use crate::domain::command::{CommandType, FinancingCommand};
use crate::domain::financing::{Financing, NewFinancing, Notification, Payment};
use crate::domain::ports::{FinancingStoreBox, NotificationStoreBox, PaymentStoreBox};
use crate::domain::schedule::{LoanTerms, ScheduleResult};
use crate::domain::workflow::{FinancingStatus, Role, WorkflowTable};
use crate::error::{FinancingError, Result};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Entry point for financing operations.
///
/// `FinancingService` owns the storage backends and the workflow table. Every
/// status change is validated against the table, persisted with an optimistic
/// version check and announced to the farmer.
pub struct FinancingService {
    financings: FinancingStoreBox,
    payments: PaymentStoreBox,
    notifications: NotificationStoreBox,
    workflow: Arc<WorkflowTable>,
}

impl FinancingService {
    /// Creates a service using the standard workflow table.
    ///
    /// # Arguments
    ///
    /// * `financings` - The store for financing records.
    /// * `payments` - The store for installment plans.
    /// * `notifications` - The store for farmer notifications.
    pub fn new(
        financings: FinancingStoreBox,
        payments: PaymentStoreBox,
        notifications: NotificationStoreBox,
    ) -> Self {
        Self::with_workflow(
            financings,
            payments,
            notifications,
            Arc::new(WorkflowTable::standard()),
        )
    }

    pub fn with_workflow(
        financings: FinancingStoreBox,
        payments: PaymentStoreBox,
        notifications: NotificationStoreBox,
        workflow: Arc<WorkflowTable>,
    ) -> Self {
        Self {
            financings,
            payments,
            notifications,
            workflow,
        }
    }

    pub fn workflow(&self) -> &WorkflowTable {
        &self.workflow
    }

    /// Registers a new financing in `draft`.
    pub async fn create(&self, request: NewFinancing) -> Result<Financing> {
        let terms = LoanTerms::new(request.principal, request.rate, request.months)?;
        let financing = Financing::new(request.id, request.farmer, terms, request.method);
        self.financings.insert(financing.clone()).await?;
        info!(
            financing = financing.id,
            farmer = financing.farmer,
            method = %financing.method,
            "financing created"
        );
        Ok(financing)
    }

    pub async fn get(&self, id: u32) -> Result<Financing> {
        self.financings
            .get(id)
            .await?
            .ok_or(FinancingError::NotFound(id))
    }

    /// Computes the payment schedule of a stored financing.
    pub async fn schedule(&self, id: u32) -> Result<ScheduleResult> {
        Ok(self.get(id).await?.schedule())
    }

    /// Destinations `role` may move financing `id` to from its current status.
    pub async fn allowed_transitions(
        &self,
        id: u32,
        role: Option<Role>,
    ) -> Result<BTreeSet<FinancingStatus>> {
        let financing = self.get(id).await?;
        Ok(self.workflow.allowed_destinations(financing.status, role))
    }

    /// Applies a status change on behalf of `role`.
    ///
    /// When `expected_version` is given the change is refused if the record
    /// moved on since the caller read it. Approving a financing persists its
    /// installment plan. If the plan or the notification cannot be stored the
    /// status change is rolled back.
    pub async fn transition(
        &self,
        id: u32,
        target: FinancingStatus,
        role: Option<Role>,
        expected_version: Option<u64>,
    ) -> Result<Financing> {
        let current = self.get(id).await?;
        let version = current.version;

        if let Some(expected) = expected_version
            && expected != version
        {
            return Err(FinancingError::VersionConflict {
                id,
                expected,
                found: version,
            });
        }

        let from = current.status;
        if !self.workflow.can_transition(from, target, role) {
            warn!(financing = id, %from, to = %target, role = ?role, "transition refused");
            return Err(FinancingError::TransitionNotAllowed {
                from,
                to: target,
                role,
            });
        }

        let mut next = current.clone();
        next.apply_status(target);
        let plan = (target == FinancingStatus::Approved)
            .then(|| Payment::plan(next.id, &next.schedule()));
        let notification = Notification::status_changed(&next);

        self.financings.update(next.clone(), version).await?;
        if let Err(e) = self.publish(plan, notification).await {
            self.revert(current, next.version).await;
            return Err(e);
        }

        info!(
            financing = id,
            %from,
            to = %target,
            version = next.version,
            "transition applied"
        );
        Ok(next)
    }

    async fn publish(&self, plan: Option<Vec<Payment>>, notification: Notification) -> Result<()> {
        if let Some(plan) = plan {
            self.payments
                .store_schedule(notification.financing, plan)
                .await?;
        }
        self.notifications.push(notification).await
    }

    /// Restores `previous` over the record written at `applied_version`.
    async fn revert(&self, previous: Financing, applied_version: u64) {
        let id = previous.id;
        match self.financings.update(previous, applied_version).await {
            Ok(()) => warn!(financing = id, "status change rolled back"),
            Err(e) => error!(financing = id, "failed to roll back status change: {e}"),
        }
    }

    /// Marks installment `period` of financing `id` as paid.
    ///
    /// Only financings in repayment (`in_progress`) accept payments.
    pub async fn pay_installment(&self, id: u32, period: u32) -> Result<Payment> {
        let financing = self.get(id).await?;
        if financing.status != FinancingStatus::InProgress {
            return Err(FinancingError::Validation(format!(
                "Financing {id} is not in repayment ({})",
                financing.status
            )));
        }

        let payment = self.payments.mark_paid(id, period).await?;
        info!(financing = id, period, amount = %payment.amount, "installment paid");
        Ok(payment)
    }

    /// Applies one batch command, as read from a commands file.
    pub async fn process_command(&self, command: FinancingCommand) -> Result<Financing> {
        match command.r#type {
            CommandType::Create => self.create(command.new_financing()?).await,
            CommandType::Transition => {
                self.transition(
                    command.financing,
                    command.target()?,
                    command.role,
                    command.version,
                )
                .await
            }
            CommandType::Pay => {
                self.pay_installment(command.financing, command.period()?)
                    .await?;
                self.get(command.financing).await
            }
        }
    }

    pub async fn payments(&self, id: u32) -> Result<Vec<Payment>> {
        self.payments.for_financing(id).await
    }

    pub async fn notifications(&self, farmer: u32) -> Result<Vec<Notification>> {
        self.notifications.for_farmer(farmer).await
    }

    /// Consumes the service and returns the final state of all financings.
    pub async fn into_results(self) -> Result<Vec<Financing>> {
        self.financings.get_all().await
    }
}

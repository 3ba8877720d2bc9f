//! JSON-RPC request handler for the control socket

use std::sync::Arc;

use tracing::debug;

use crate::{
    controller::{Controller, IoctlTarget},
    driver::WirelessDriver,
    protocol::{
        AckResponse, AttachResponse, AttachVirtualParams, DetachVirtualParams, ErrorCode,
        InterfacesResponse, IoctlParams, IoctlResponse, JsonRpcError, JsonRpcRequest,
        JsonRpcResponse, Request, Response, SetDebugFlagsParams,
    },
};

/// Maps control requests onto controller operations
pub struct RequestHandler<D: WirelessDriver> {
    controller: Arc<Controller<D>>,
}

impl<D: WirelessDriver> RequestHandler<D> {
    pub fn new(controller: Arc<Controller<D>>) -> Self {
        Self { controller }
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id;
        let result = match request.request {
            Request::Ioctl(params) => self.handle_ioctl(params).await,
            Request::ListInterfaces => self.handle_list_interfaces().await,
            Request::AttachVirtual(params) => self.handle_attach_virtual(params).await,
            Request::DetachVirtual(params) => self.handle_detach_virtual(params).await,
            Request::SetPowerState(params) => {
                self.controller.set_system_power_state(params.state).await;
                Ok(Response::Ack(AckResponse::ok()))
            }
            Request::SetDebugFlags(params) => self.handle_set_debug_flags(params).await,
        };

        JsonRpcResponse::from_result(result, id)
    }

    async fn handle_ioctl(&self, params: IoctlParams) -> Result<Response, JsonRpcError> {
        let IoctlParams {
            if_name,
            command,
            mut request,
        } = params;

        let result = self
            .controller
            .ioctl(&if_name, command.code(), &mut request)
            .await;
        debug!(interface = %if_name, ?command, ?result, "control ioctl");

        Ok(Response::Ioctl(IoctlResponse::from_result(&result, request)))
    }

    async fn handle_list_interfaces(&self) -> Result<Response, JsonRpcError> {
        let mut interfaces = Vec::new();
        if let Some(primary) = self.controller.network_interface().await {
            interfaces.push(primary.info());
        }
        interfaces.extend(
            self.controller
                .virtual_interfaces()
                .await
                .iter()
                .map(|vif| vif.info()),
        );

        Ok(Response::Interfaces(InterfacesResponse::ok(
            self.controller.power_state(),
            interfaces,
        )))
    }

    async fn handle_attach_virtual(
        &self,
        params: AttachVirtualParams,
    ) -> Result<Response, JsonRpcError> {
        let vif = self
            .controller
            .attach_virtual_interface(params.address, params.role, params.register)
            .await
            .map_err(|e| JsonRpcError::from(&e))?;

        Ok(Response::Attached(AttachResponse::ok(vif.info())))
    }

    async fn handle_detach_virtual(
        &self,
        params: DetachVirtualParams,
    ) -> Result<Response, JsonRpcError> {
        let vif = self
            .controller
            .find_virtual_interface(&params.name)
            .await
            .ok_or_else(|| {
                JsonRpcError::new(
                    ErrorCode::NotAttached,
                    format!("no virtual interface {}", params.name),
                )
            })?;

        self.controller
            .detach_virtual_interface(&vif)
            .await
            .map_err(|e| JsonRpcError::from(&e))?;

        Ok(Response::Ack(AckResponse::ok()))
    }

    async fn handle_set_debug_flags(
        &self,
        params: SetDebugFlagsParams,
    ) -> Result<Response, JsonRpcError> {
        let flags = params
            .decode_flags()
            .map_err(|e| JsonRpcError::new(ErrorCode::InvalidParams, e))?;
        let target = self
            .controller
            .resolve(&params.if_name)
            .await
            .ok_or_else(|| {
                let message = format!("no interface {}", params.if_name);
                JsonRpcError::new(ErrorCode::NotAttached, message)
            })?;

        match target {
            IoctlTarget::Primary(intf) => intf.set_debug_flags(flags),
            IoctlTarget::Virtual(vif) => vif.set_debug_flags(flags),
        }
        Ok(Response::Ack(AckResponse::ok()))
    }
}

//! Hand-maintained prost bindings for the slice of the open inference
//! protocol (KServe v2, as served by ModelMesh/Triton) that the `ModelInfer`
//! call needs. Field numbers follow the upstream `grpc_predict_v2.proto`;
//! fields this crate never reads or writes are omitted, which protobuf
//! tolerates on both encode and decode.

/// Scalar payloads for a tensor. Only INT64 tensors are sent.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InferTensorContents {
    #[prost(int64, repeated, tag = "3")]
    pub int64_contents: Vec<i64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InferInputTensor {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub datatype: String,
    #[prost(int64, repeated, tag = "3")]
    pub shape: Vec<i64>,
    #[prost(message, optional, tag = "5")]
    pub contents: Option<InferTensorContents>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InferOutputTensor {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub datatype: String,
    #[prost(int64, repeated, tag = "3")]
    pub shape: Vec<i64>,
    #[prost(message, optional, tag = "5")]
    pub contents: Option<InferTensorContents>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ModelInferRequest {
    #[prost(string, tag = "1")]
    pub model_name: String,
    #[prost(string, tag = "2")]
    pub model_version: String,
    #[prost(string, tag = "3")]
    pub id: String,
    #[prost(message, repeated, tag = "5")]
    pub inputs: Vec<InferInputTensor>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ModelInferResponse {
    #[prost(string, tag = "1")]
    pub model_name: String,
    #[prost(string, tag = "2")]
    pub model_version: String,
    #[prost(string, tag = "3")]
    pub id: String,
    #[prost(message, repeated, tag = "5")]
    pub outputs: Vec<InferOutputTensor>,
    /// Tensor data in row-major order, one entry per output tensor, used by
    /// servers that answer in raw binary form instead of typed contents.
    #[prost(bytes = "vec", repeated, tag = "6")]
    pub raw_output_contents: Vec<Vec<u8>>,
}

/// Hand-written counterpart of the tonic-generated service client, covering
/// the single unary call this crate makes.
pub mod grpc_inference_service_client {
    use tonic::codec::ProstCodec;
    use tonic::codegen::http::uri::PathAndQuery;
    use tonic::transport::Channel;

    use super::{ModelInferRequest, ModelInferResponse};

    #[derive(Debug, Clone)]
    pub struct GrpcInferenceServiceClient {
        inner: tonic::client::Grpc<Channel>,
    }

    impl GrpcInferenceServiceClient {
        pub fn new(channel: Channel) -> Self {
            Self {
                inner: tonic::client::Grpc::new(channel),
            }
        }

        pub async fn model_infer(
            &mut self,
            request: impl tonic::IntoRequest<ModelInferRequest>,
        ) -> Result<tonic::Response<ModelInferResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::unavailable(format!("Service was not ready: {e}"))
            })?;
            let codec: ProstCodec<ModelInferRequest, ModelInferResponse> = ProstCodec::default();
            let path = PathAndQuery::from_static("/inference.GRPCInferenceService/ModelInfer");
            self.inner.unary(request.into_request(), path, codec).await
        }
    }
}

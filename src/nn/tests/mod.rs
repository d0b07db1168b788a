mod layer_dropout;
mod layer_linear;
mod layer_max_pool2d;
mod optimizer;

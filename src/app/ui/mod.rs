mod details;
mod fps;
mod panels;
mod workflow;

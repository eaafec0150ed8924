use crate::scene::EntityId;

/// Index of a tracked object in authoring order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

/// Opaque handle to an audio channel issued by the audio engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelHandle(pub usize);

/// One anchored bird as seen by the audio updater.
///
/// `entity` is the bird's anchor in the scene graph (the node gestures move);
/// `channel` stays `None` until its clip has been prepared.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedObject {
    pub id: ObjectId,
    pub label: String,
    pub entity: EntityId,
    pub channel: Option<ChannelHandle>,
    pub attenuation_scale: f32,
}

/// Fixed list of tracked objects owned by the scene controller and handed to
/// the updater each frame.
#[derive(Clone, Debug, Default)]
pub struct TrackedObjectRegistry {
    objects: Vec<TrackedObject>,
}

impl TrackedObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        label: impl Into<String>,
        entity: EntityId,
        attenuation_scale: f32,
    ) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(TrackedObject {
            id,
            label: label.into(),
            entity,
            channel: None,
            attenuation_scale,
        });
        id
    }

    /// Returns false if `id` is unknown.
    pub fn attach_channel(&mut self, id: ObjectId, channel: ChannelHandle) -> bool {
        match self.objects.get_mut(id.0) {
            Some(o) => {
                o.channel = Some(channel);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: ObjectId) -> Option<&TrackedObject> {
        self.objects.get(id.0)
    }

    pub fn find_by_entity(&self, entity: EntityId) -> Option<&TrackedObject> {
        self.objects.iter().find(|o| o.entity == entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedObject> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }
}
